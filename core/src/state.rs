//! Typed access to persisted wheel state.
//!
//! Each key holds one JSON document. Operations read what they need at the
//! start and write whole values back at the end; nothing is patched in
//! place. A value that fails to decode is logged and treated as absent.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use spinwheel_abi::{
    DesignatedWinner, ImageSize, RemovedEntry, SpinMode, SpinNumber, SpinResult, StoreResult,
    Theme,
};
use spinwheel_lib::klog_warn;

pub const KEY_SPIN_COUNT: &str = "spinCount";
pub const KEY_SPIN_MODES: &str = "spinModes";
pub const KEY_GLOBAL_MODE: &str = "spinMode";
pub const KEY_DESIGNATED: &str = "selectedWinners";
pub const KEY_WINNERS: &str = "winnersList";
pub const KEY_REMOVED: &str = "removedEntries";
pub const KEY_THEME: &str = "theme";
pub const KEY_CENTER_IMAGE: &str = "centerImage";
pub const KEY_CENTER_IMAGE_SIZE: &str = "centerImageSize";

/// Raw key/value storage under the state store.
pub trait PersistBackend: Send {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;
    fn delete(&mut self, key: &str) -> StoreResult<()>;
}

/// Process-local backend; state is gone when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

pub struct StateStore {
    backend: Box<dyn PersistBackend>,
}

impl StateStore {
    pub fn new(backend: Box<dyn PersistBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(text) = self.backend.read(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                klog_warn!("state: discarding unreadable '{}': {}", key, err);
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.backend.write(key, &text)
    }

    // --- spin counter -----------------------------------------------------

    /// Spins completed so far; the next spin is `spin_count() + 1`.
    pub fn spin_count(&self) -> StoreResult<SpinNumber> {
        Ok(self.read_json(KEY_SPIN_COUNT)?.unwrap_or(0))
    }

    pub fn set_spin_count(&mut self, count: SpinNumber) -> StoreResult<()> {
        self.write_json(KEY_SPIN_COUNT, &count)
    }

    // --- modes ------------------------------------------------------------

    pub fn spin_modes(&self) -> StoreResult<BTreeMap<SpinNumber, SpinMode>> {
        Ok(self.read_json(KEY_SPIN_MODES)?.unwrap_or_default())
    }

    pub fn set_spin_mode(&mut self, spin: SpinNumber, mode: SpinMode) -> StoreResult<()> {
        let mut modes = self.spin_modes()?;
        modes.insert(spin, mode);
        self.write_json(KEY_SPIN_MODES, &modes)
    }

    pub fn global_mode(&self) -> StoreResult<Option<SpinMode>> {
        self.read_json(KEY_GLOBAL_MODE)
    }

    pub fn set_global_mode(&mut self, mode: Option<SpinMode>) -> StoreResult<()> {
        match mode {
            Some(mode) => self.write_json(KEY_GLOBAL_MODE, &mode),
            None => self.backend.delete(KEY_GLOBAL_MODE),
        }
    }

    /// Per-spin override, then the persisted global mode, then `fallback`.
    pub fn mode_for_spin(&self, spin: SpinNumber, fallback: SpinMode) -> StoreResult<SpinMode> {
        if let Some(mode) = self.spin_modes()?.get(&spin) {
            return Ok(*mode);
        }
        Ok(self.global_mode()?.unwrap_or(fallback))
    }

    // --- designated winners -----------------------------------------------

    pub fn designated_winners(&self) -> StoreResult<BTreeMap<SpinNumber, DesignatedWinner>> {
        Ok(self.read_json(KEY_DESIGNATED)?.unwrap_or_default())
    }

    pub fn designated_for(&self, spin: SpinNumber) -> StoreResult<Option<DesignatedWinner>> {
        Ok(self.designated_winners()?.remove(&spin))
    }

    /// Replace whatever was designated for `spin`.
    pub fn designate(&mut self, spin: SpinNumber, winner: DesignatedWinner) -> StoreResult<()> {
        let mut winners = self.designated_winners()?;
        winners.insert(spin, winner);
        self.write_json(KEY_DESIGNATED, &winners)
    }

    pub fn clear_designation(&mut self, spin: SpinNumber) -> StoreResult<bool> {
        let mut winners = self.designated_winners()?;
        let had = winners.remove(&spin).is_some();
        if had {
            self.write_json(KEY_DESIGNATED, &winners)?;
        }
        Ok(had)
    }

    // --- results and removals ---------------------------------------------

    pub fn winners(&self) -> StoreResult<Vec<SpinResult>> {
        Ok(self.read_json(KEY_WINNERS)?.unwrap_or_default())
    }

    pub fn set_winners(&mut self, winners: &[SpinResult]) -> StoreResult<()> {
        self.write_json(KEY_WINNERS, winners)
    }

    pub fn removed_entries(&self) -> StoreResult<Vec<RemovedEntry>> {
        Ok(self.read_json(KEY_REMOVED)?.unwrap_or_default())
    }

    pub fn set_removed_entries(&mut self, removed: &[RemovedEntry]) -> StoreResult<()> {
        self.write_json(KEY_REMOVED, removed)
    }

    // --- presentation -----------------------------------------------------

    pub fn theme(&self) -> StoreResult<Theme> {
        Ok(self.read_json(KEY_THEME)?.unwrap_or_default())
    }

    pub fn set_theme(&mut self, theme: Theme) -> StoreResult<()> {
        self.write_json(KEY_THEME, &theme)
    }

    pub fn center_image(&self) -> StoreResult<Option<String>> {
        self.read_json(KEY_CENTER_IMAGE)
    }

    pub fn set_center_image(&mut self, image: Option<&str>) -> StoreResult<()> {
        match image {
            Some(image) => self.write_json(KEY_CENTER_IMAGE, image),
            None => self.backend.delete(KEY_CENTER_IMAGE),
        }
    }

    pub fn center_image_size(&self) -> StoreResult<ImageSize> {
        Ok(self.read_json(KEY_CENTER_IMAGE_SIZE)?.unwrap_or_default())
    }

    pub fn set_center_image_size(&mut self, size: ImageSize) -> StoreResult<()> {
        self.write_json(KEY_CENTER_IMAGE_SIZE, &size)
    }

    /// Forget results, designations, modes and removals; the counter goes
    /// back to zero. Theme and center image are kept.
    pub fn reset_all(&mut self) -> StoreResult<()> {
        self.backend.delete(KEY_WINNERS)?;
        self.backend.delete(KEY_DESIGNATED)?;
        self.backend.delete(KEY_SPIN_MODES)?;
        self.backend.delete(KEY_GLOBAL_MODE)?;
        self.backend.delete(KEY_REMOVED)?;
        self.set_spin_count(0)
    }
}
