//! Spin planning: pick the mode, commit the batch, compute where the wheel
//! stops.

use spinwheel_abi::{DesignatedWinner, SpinMode};
use spinwheel_lib::{WheelConfig, WheelRng, klog_debug, klog_info, klog_warn};

use crate::angle::{
    CENTER_TOLERANCE, FULL_TURN, circular_distance, normalize_degrees, pointer_angle,
    rotation_for_wheel_angle, shortest_adjustment, slice_center,
};
use crate::batch::{BatchSampler, CommittedBatch};
use crate::entries::EntryPool;

#[derive(Clone, Debug)]
pub struct SpinPlan {
    /// Mode actually used; a fixed request that cannot resolve plans random.
    pub mode: SpinMode,
    pub start_rotation: f64,
    pub target_rotation: f64,
    pub committed_batch: CommittedBatch,
    /// Batch slot the plan lands on, known only for fixed spins.
    pub predicted_index: Option<usize>,
}

/// Everything the planner reads for one spin.
pub struct PlanRequest<'a> {
    pub pool: &'a EntryPool,
    /// Batch currently on screen; committed as-is for random spins.
    pub visible: &'a CommittedBatch,
    pub mode: SpinMode,
    pub designated: Option<&'a DesignatedWinner>,
    pub current_rotation: f64,
}

/// Resolve a designated winner to a pool position.
///
/// Ticket match wins; otherwise the base name is compared case-insensitively
/// with any `"(ticket)"` suffix stripped. Returns `None` when neither hits.
pub fn resolve_designated(pool: &EntryPool, designated: &DesignatedWinner) -> Option<usize> {
    if let Some(ticket) = designated
        .ticket
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        if let Some(index) = pool.index_of_ticket(ticket) {
            return Some(index);
        }
        klog_debug!("planner: ticket {} not in pool, trying name", ticket);
    }

    let name = designated.name.trim();
    if name.is_empty() {
        return None;
    }
    pool.positions_by_base_name(name).first().copied().or_else(|| {
        // A bare name may still be a ticket-only entry.
        pool.positions_by_label(name).first().copied()
    })
}

/// Landing rotation that centers slice `index` of `count` under the pointer.
///
/// Starts from `current + spins * 360` and applies the smallest signed
/// adjustment (|adj| <= 180). The result is verified against the slice
/// center and recomputed directly if the check fails.
pub fn fixed_target(current: f64, spins: f64, index: usize, count: usize) -> f64 {
    let center = slice_center(index, count);
    let required = rotation_for_wheel_angle(center);
    let base = current + spins * FULL_TURN;
    let base_mod = normalize_degrees(base);
    let target = base + shortest_adjustment(base_mod, required);

    let landed = pointer_angle(target);
    if circular_distance(landed, center) < CENTER_TOLERANCE {
        return target;
    }

    klog_warn!(
        "planner: landing check failed (landed {:.4}, center {:.4}); recomputing",
        landed,
        center
    );
    base - base_mod + required
}

pub struct SpinPlanner {
    min_turns: f64,
    max_turns: f64,
}

impl SpinPlanner {
    pub fn new(min_turns: f64, max_turns: f64) -> Self {
        Self {
            min_turns: min_turns.min(max_turns),
            max_turns: min_turns.max(max_turns),
        }
    }

    pub fn from_config(config: &WheelConfig) -> Self {
        let (lo, hi) = config.turn_range();
        Self::new(lo, hi)
    }

    fn draw_turns(&self, rng: &mut WheelRng) -> f64 {
        self.min_turns + rng.unit() * (self.max_turns - self.min_turns)
    }

    pub fn plan(
        &self,
        request: &PlanRequest<'_>,
        sampler: &BatchSampler,
        rng: &mut WheelRng,
    ) -> SpinPlan {
        if request.mode == SpinMode::Fixed {
            match request.designated {
                Some(designated) => {
                    if let Some(winner) = resolve_designated(request.pool, designated) {
                        return self.plan_fixed(request, sampler, winner, rng);
                    }
                    klog_warn!(
                        "planner: designated winner '{}' not found, spinning random",
                        designated
                    );
                }
                None => klog_warn!("planner: fixed mode without a designated winner"),
            }
        }
        self.plan_random(request.visible.clone(), request.current_rotation, rng)
    }

    /// Commit `batch` and stop at a uniformly random angle.
    pub fn plan_random(
        &self,
        batch: CommittedBatch,
        current_rotation: f64,
        rng: &mut WheelRng,
    ) -> SpinPlan {
        let spins = self.draw_turns(rng);
        let offset = rng.unit() * FULL_TURN;
        SpinPlan {
            mode: SpinMode::Random,
            start_rotation: current_rotation,
            target_rotation: current_rotation + spins * FULL_TURN + offset,
            committed_batch: batch,
            predicted_index: None,
        }
    }

    fn plan_fixed(
        &self,
        request: &PlanRequest<'_>,
        sampler: &BatchSampler,
        winner: usize,
        rng: &mut WheelRng,
    ) -> SpinPlan {
        let sampled = sampler.needs_sampling(request.pool);
        let pinned_on_screen = sampled
            && request.visible.len() == sampler.capacity()
            && request.visible.first() == request.pool.get(winner);
        let batch = if pinned_on_screen {
            klog_debug!("planner: winner already in slot 0, keeping the visible batch");
            request.visible.clone()
        } else {
            sampler.sample(request.pool, Some(winner), rng)
        };
        // Small pools are shown whole, so the winner keeps its own slot.
        let slot = if sampled { 0 } else { winner };

        let spins = self.draw_turns(rng);
        let target = fixed_target(request.current_rotation, spins, slot, batch.len());

        if let Some(entry) = batch.get(slot) {
            klog_info!(
                "planner: fixed spin on '{}' at slot {} of {}",
                entry,
                slot,
                batch.len()
            );
        }

        SpinPlan {
            mode: SpinMode::Fixed,
            start_rotation: request.current_rotation,
            target_rotation: target,
            committed_batch: batch,
            predicted_index: Some(slot),
        }
    }
}
