//! The visible subset of the pool.
//!
//! While idle the sampler redraws its batch on every resample tick. A spin
//! takes a [`CommittedBatch`] snapshot that planner, animator and resolver
//! all share; nothing can reorder it underneath them.

use std::ops::Deref;
use std::sync::Arc;

use spinwheel_abi::{Entry, MAX_VISIBLE_SLICES};
use spinwheel_lib::WheelRng;

use crate::entries::EntryPool;

/// Immutable ordered snapshot of the wedges on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommittedBatch {
    entries: Arc<[Entry]>,
}

impl CommittedBatch {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Whether both handles point at the same snapshot.
    pub fn same_snapshot(&self, other: &CommittedBatch) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Deref for CommittedBatch {
    type Target = [Entry];

    fn deref(&self) -> &[Entry] {
        &self.entries
    }
}

pub struct BatchSampler {
    capacity: usize,
    visible: CommittedBatch,
}

impl BatchSampler {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(1, MAX_VISIBLE_SLICES),
            visible: CommittedBatch::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn visible(&self) -> &CommittedBatch {
        &self.visible
    }

    /// Whether the pool is larger than one wheel can show.
    #[inline]
    pub fn needs_sampling(&self, pool: &EntryPool) -> bool {
        pool.len() > self.capacity
    }

    /// Draw a fresh visible batch. `pinned` is a pool position that must be
    /// shown at slot 0 when sampling applies.
    pub fn resample(
        &mut self,
        pool: &EntryPool,
        pinned: Option<usize>,
        rng: &mut WheelRng,
    ) -> &CommittedBatch {
        self.visible = self.sample(pool, pinned, rng);
        &self.visible
    }

    /// Replace the visible batch verbatim, e.g. with a committed spin batch.
    pub fn show(&mut self, batch: CommittedBatch) {
        self.visible = batch;
    }

    pub fn sample(
        &self,
        pool: &EntryPool,
        pinned: Option<usize>,
        rng: &mut WheelRng,
    ) -> CommittedBatch {
        let len = pool.len();
        if len <= self.capacity {
            return CommittedBatch::new(pool.entries().to_vec());
        }

        let entries = pool.entries();
        match pinned.filter(|p| *p < len) {
            Some(winner) => {
                let mut batch = Vec::with_capacity(self.capacity);
                batch.push(entries[winner].clone());
                // Draw from the pool with the winner's slot skipped.
                for pick in rng.sample_indices(len - 1, self.capacity - 1) {
                    let index = if pick >= winner { pick + 1 } else { pick };
                    batch.push(entries[index].clone());
                }
                CommittedBatch::new(batch)
            }
            None => CommittedBatch::new(
                rng.sample_indices(len, self.capacity)
                    .into_iter()
                    .map(|i| entries[i].clone())
                    .collect(),
            ),
        }
    }
}
