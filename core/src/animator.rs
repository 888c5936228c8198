//! Time-driven spin animation.
//!
//! The animator owns no clock. Front ends call [`SpinAnimator::frame`] with
//! the current uptime; each call advances the rotation along a two-phase
//! easing curve and, once the duration has elapsed, snaps to the exact
//! target and hands back the plan exactly once.

use spinwheel_lib::{klog_debug, klog_trace};

use crate::planner::SpinPlan;

/// Share of the run spent accelerating.
pub const ACCEL_FRACTION: f64 = 0.30;
pub const ACCEL_POWER: f64 = 2.0;
pub const DECEL_POWER: f64 = 7.0;

/// Progress for normalized time `t` in `[0, 1]`.
///
/// Phase 1 is `k * t^2`, phase 2 is `1 - A * (1 - t)^7`. The split `Y` is the
/// share of distance covered while decelerating, chosen so that position and
/// velocity agree at `t = ACCEL_FRACTION`.
pub fn ease(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t1 = ACCEL_FRACTION;
    let (p1, p2) = (ACCEL_POWER, DECEL_POWER);

    let y = (p1 * (1.0 - t1)) / (p2 * t1 + p1 * (1.0 - t1));
    let k = (1.0 - y) / t1.powf(p1);
    let a = y / (1.0 - t1).powf(p2);

    if t < t1 {
        k * t.powf(p1)
    } else {
        1.0 - a * (1.0 - t).powf(p2)
    }
}

/// Side effects of a running spin.
pub trait AnimationObserver {
    fn on_frame(&mut self, _rotation: f64) {}

    /// Fired every `tick_degrees` of travel, for click sounds.
    fn on_tick(&mut self, _rotation: f64) {}

    fn on_complete(&mut self, _rotation: f64) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl AnimationObserver for NullObserver {}

#[derive(Debug)]
pub enum FrameOutcome {
    /// No run in flight; nothing was written.
    Idle,
    Moved(f64),
    /// The run finished on this frame. Returned once per run.
    Completed { rotation: f64, plan: SpinPlan },
}

struct SpinRun {
    plan: SpinPlan,
    started_at_ms: u64,
    duration_ms: u64,
    last_tick_rotation: f64,
}

pub struct SpinAnimator {
    run: Option<SpinRun>,
    tick_degrees: f64,
    runs_started: u64,
}

impl SpinAnimator {
    pub fn new(tick_degrees: f64) -> Self {
        Self {
            run: None,
            tick_degrees,
            runs_started: 0,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Total runs ever started, including cancelled ones.
    #[inline]
    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    pub fn plan(&self) -> Option<&SpinPlan> {
        self.run.as_ref().map(|r| &r.plan)
    }

    /// Begin animating `plan`. Any run already in flight is dropped first.
    pub fn start(&mut self, plan: SpinPlan, duration_ms: u64, now_ms: u64) {
        if self.cancel() {
            klog_debug!("animator: previous run cancelled by a new spin");
        }
        self.runs_started += 1;
        self.run = Some(SpinRun {
            last_tick_rotation: plan.start_rotation,
            plan,
            started_at_ms: now_ms,
            duration_ms: duration_ms.max(1),
        });
    }

    /// Drop the run in flight. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        self.run.take().is_some()
    }

    /// Advance to `now_ms`, writing the new rotation through `rotation`.
    pub fn frame<O: AnimationObserver + ?Sized>(
        &mut self,
        now_ms: u64,
        rotation: &mut f64,
        observer: &mut O,
    ) -> FrameOutcome {
        let Some(run) = self.run.as_mut() else {
            return FrameOutcome::Idle;
        };

        let elapsed = now_ms.saturating_sub(run.started_at_ms);
        let t = elapsed as f64 / run.duration_ms as f64;
        let start = run.plan.start_rotation;
        let target = run.plan.target_rotation;

        if t < 1.0 {
            let current = start + (target - start) * ease(t);
            *rotation = current;
            observer.on_frame(current);
            if (current - run.last_tick_rotation).abs() >= self.tick_degrees {
                run.last_tick_rotation = current;
                observer.on_tick(current);
            }
            klog_trace!("animator: t={:.3} rotation={:.3}", t, current);
            return FrameOutcome::Moved(current);
        }

        let Some(run) = self.run.take() else {
            return FrameOutcome::Idle;
        };
        *rotation = target;
        observer.on_frame(target);
        observer.on_complete(target);
        klog_debug!("animator: completed at {:.4}", target);
        FrameOutcome::Completed {
            rotation: target,
            plan: run.plan,
        }
    }
}
