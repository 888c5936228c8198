//! Entry-set storage.
//!
//! [`RamStore`] keeps everything in memory; [`DirStore`] keeps one JSON file
//! per set under a data directory and hands out a [`FileBackend`] for the
//! wheel's persisted state.

pub mod dirstore;
pub mod ramstore;
pub mod secret;
pub mod store;

#[cfg(test)]
mod dirstore_tests;

pub use dirstore::{DirStore, FileBackend};
pub use ramstore::RamStore;
pub use secret::{DEFAULT_SECRET, MIN_SECRET_LEN, SecretDigest};
pub use store::{MAX_UPLOAD_BYTES, SetTable, SpinFileStore, check_upload_size, upload_name};
