//! Spinwheel shared types
//!
//! This crate provides the canonical definitions for all types shared between
//! the engine, the storage layer, the ingest drivers and the front ends.
//! Having a single source of truth keeps the persisted JSON layout and the
//! in-memory model from drifting apart.

#![forbid(unsafe_code)]

pub mod draw;
pub mod entry;
pub mod entry_set;
pub mod error;
pub mod flags;
pub mod spin;
pub mod view;

/// Largest number of wedges ever drawn at once.
pub const MAX_VISIBLE_SLICES: usize = 100;

pub use draw::Color32;
pub use entry::{Entry, RawRecord, RemovedEntry, normalize_key, split_ticket_suffix};
pub use entry_set::{EntrySet, EntrySetId, EntrySetSummary, NewEntrySet};
pub use error::*;
pub use flags::WheelFlags;
pub use spin::{DesignatedWinner, SpinMode, SpinNumber, SpinResult};
pub use view::{ImageSize, SliceColor, Theme, WheelView};
