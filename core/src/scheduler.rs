//! Periodic timers driven by the caller's clock.
//!
//! Nothing here sleeps or spawns. The owner calls [`TimerQueue::run_due`]
//! from its frame loop and every timer whose deadline has passed fires once,
//! however many intervals were missed.

use spinwheel_lib::klog_trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CancelHandle(u64);

/// Timer body: receives the shared context and the current uptime.
pub type TimerCallback<C> = Box<dyn FnMut(&mut C, u64) + Send>;

pub trait Scheduler<C> {
    fn schedule_periodic(
        &mut self,
        interval_ms: u64,
        now_ms: u64,
        callback: TimerCallback<C>,
    ) -> CancelHandle;

    /// Returns whether the handle was still armed.
    fn cancel(&mut self, handle: CancelHandle) -> bool;
}

struct TimerEntry<C> {
    handle: CancelHandle,
    interval_ms: u64,
    next_due_ms: u64,
    callback: TimerCallback<C>,
}

pub struct TimerQueue<C> {
    entries: Vec<TimerEntry<C>>,
    next_id: u64,
}

impl<C> TimerQueue<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn is_armed(&self, handle: CancelHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fire every timer due at `now_ms`. Returns how many fired.
    pub fn run_due(&mut self, now_ms: u64, ctx: &mut C) -> usize {
        let mut fired = 0;
        for entry in self.entries.iter_mut() {
            if entry.next_due_ms > now_ms {
                continue;
            }
            (entry.callback)(ctx, now_ms);
            fired += 1;

            let behind = now_ms - entry.next_due_ms;
            let skipped = behind / entry.interval_ms;
            entry.next_due_ms += (skipped + 1) * entry.interval_ms;
            if skipped > 0 {
                klog_trace!("scheduler: timer {:?} coalesced {} ticks", entry.handle, skipped);
            }
        }
        fired
    }
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> for TimerQueue<C> {
    fn schedule_periodic(
        &mut self,
        interval_ms: u64,
        now_ms: u64,
        callback: TimerCallback<C>,
    ) -> CancelHandle {
        let handle = CancelHandle(self.next_id);
        self.next_id += 1;
        let interval_ms = interval_ms.max(1);
        self.entries.push(TimerEntry {
            handle,
            interval_ms,
            next_due_ms: now_ms + interval_ms,
            callback,
        });
        handle
    }

    fn cancel(&mut self, handle: CancelHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }
}
