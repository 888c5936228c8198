//! Spin engine.
//!
//! Data flows leaf to root: [`entries`] normalizes records into a pool,
//! [`batch`] picks the visible wedges, [`planner`] commits a batch and a
//! landing angle, [`animator`] moves the wheel there, [`resolver`] reads the
//! winner back off the frozen angle and [`ledger`] records it. [`wheel`]
//! sequences all of it.

pub mod angle;
pub mod animator;
pub mod batch;
pub mod entries;
pub mod ledger;
pub mod palette;
pub mod planner;
pub mod resolver;
pub mod scheduler;
pub mod state;
pub mod wheel;

#[cfg(test)]
mod angle_tests;
#[cfg(test)]
mod scheduler_tests;
#[cfg(test)]
mod wheel_tests;

pub use animator::{AnimationObserver, FrameOutcome, NullObserver, SpinAnimator, ease};
pub use batch::{BatchSampler, CommittedBatch};
pub use entries::{EntryPool, PLACEHOLDER_NAMES, normalize_record};
pub use ledger::{PlannedRemoval, RemovalKey, RemovalOutcome, WinnerLedger};
pub use planner::{PlanRequest, SpinPlan, SpinPlanner, fixed_target, resolve_designated};
pub use resolver::{Resolution, resolve, slice_at_pointer};
pub use scheduler::{CancelHandle, Scheduler, TimerCallback, TimerQueue};
pub use state::{MemoryBackend, PersistBackend, StateStore};
pub use wheel::{NoEvents, SpinStarted, SpinWheel, WheelEvents};
