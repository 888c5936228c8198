//! Entry-set storage abstractions.
//!
//! Every backend implements [`SpinFileStore`]. The bookkeeping that does not
//! depend on where bytes live (id allocation, validation, ordering, secret
//! checks) sits in [`SetTable`], which the backends wrap in a lock.

mod table;

pub use table::SetTable;

use spinwheel_abi::{
    EntrySet, EntrySetId, EntrySetSummary, NewEntrySet, RawRecord, StoreError, StoreResult,
};
use spinwheel_lib::WheelRng;

/// Largest accepted spreadsheet upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Extensions dropped from a source file name when no display name is given.
pub const STRIPPED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "json"];

/// Storage for uploaded entry sets and the admin secret.
///
/// Implementations are shared between the wheel and admin front ends, so all
/// methods take `&self` and lock internally.
pub trait SpinFileStore: Send + Sync {
    /// Short backend name for logs ("ram", "dir").
    fn name(&self) -> &'static str;

    /// All sets, newest first.
    ///
    /// # Arguments
    /// * `active_only` - Skip sets an admin has switched off.
    fn list(&self, active_only: bool) -> StoreResult<Vec<EntrySet>>;

    /// Listing rows without record payloads, newest first.
    fn list_summaries(&self) -> StoreResult<Vec<EntrySetSummary>> {
        Ok(self
            .list(false)?
            .iter()
            .map(EntrySetSummary::from)
            .collect())
    }

    fn get(&self, id: EntrySetId) -> StoreResult<EntrySet>;

    /// Store a new set. New sets start active.
    ///
    /// # Errors
    /// `EmptyFilename` or `EmptyRecords` when the upload is unusable.
    fn create(&self, upload: NewEntrySet) -> StoreResult<EntrySet>;

    fn delete(&self, id: EntrySetId) -> StoreResult<()>;

    /// Flip the active flag. Returns the new value.
    fn toggle_active(&self, id: EntrySetId) -> StoreResult<bool>;

    /// Pin (or with `None`, unpin) the ticket that wins spin #1.
    fn set_pinned_ticket(&self, id: EntrySetId, ticket: Option<&str>) -> StoreResult<()>;

    /// Pick one record of a set uniformly at random.
    ///
    /// Returns the record's index and the record itself.
    fn draw(&self, id: EntrySetId, rng: &mut WheelRng) -> StoreResult<(usize, RawRecord)>;

    /// Whether `secret` matches the stored admin secret.
    ///
    /// # Errors
    /// `MissingField` for an empty secret.
    fn check_secret(&self, secret: &str) -> StoreResult<bool>;

    /// Replace the admin secret.
    ///
    /// # Errors
    /// * `MissingField` - either value is empty.
    /// * `SecretTooShort` - `new` is shorter than the minimum.
    /// * `WrongSecret` - `old` does not match.
    fn update_secret(&self, old: &str, new: &str) -> StoreResult<()>;
}

/// Display name for an upload: the explicit name when given, else the
/// source file name with its directory and spreadsheet extension removed.
pub fn upload_name(explicit: Option<&str>, source: &str) -> StoreResult<String> {
    if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }

    let file = source
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source)
        .trim();
    let stem = match file.rsplit_once('.') {
        Some((stem, ext))
            if STRIPPED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            stem
        }
        _ => file,
    };

    let stem = stem.trim();
    if stem.is_empty() {
        return Err(StoreError::EmptyFilename);
    }
    Ok(stem.to_string())
}

pub fn check_upload_size(size: usize) -> StoreResult<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(StoreError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}
