use std::sync::Arc;

use spin::Mutex;
use spinwheel_abi::{EntrySet, EntrySetId, NewEntrySet, RawRecord, StoreResult};
use spinwheel_lib::{Clock, SystemClock, WheelRng};

use crate::store::{SetTable, SpinFileStore};

/// Process-local store. Everything is lost when it is dropped.
pub struct RamStore {
    inner: Mutex<SetTable>,
    clock: Arc<dyn Clock>,
}

impl RamStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()), WheelRng::from_entropy())
    }

    pub fn with_clock(clock: Arc<dyn Clock>, rng: WheelRng) -> Self {
        Self {
            inner: Mutex::new(SetTable::new(rng)),
            clock,
        }
    }
}

impl Default for RamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinFileStore for RamStore {
    fn name(&self) -> &'static str {
        "ram"
    }

    fn list(&self, active_only: bool) -> StoreResult<Vec<EntrySet>> {
        Ok(self.inner.lock().list(active_only))
    }

    fn get(&self, id: EntrySetId) -> StoreResult<EntrySet> {
        self.inner.lock().get(id).cloned()
    }

    fn create(&self, upload: NewEntrySet) -> StoreResult<EntrySet> {
        let now = self.clock.now_utc();
        self.inner.lock().create(upload, now)
    }

    fn delete(&self, id: EntrySetId) -> StoreResult<()> {
        self.inner.lock().delete(id).map(|_| ())
    }

    fn toggle_active(&self, id: EntrySetId) -> StoreResult<bool> {
        self.inner.lock().toggle_active(id)
    }

    fn set_pinned_ticket(&self, id: EntrySetId, ticket: Option<&str>) -> StoreResult<()> {
        self.inner.lock().set_pinned_ticket(id, ticket).map(|_| ())
    }

    fn draw(&self, id: EntrySetId, rng: &mut WheelRng) -> StoreResult<(usize, RawRecord)> {
        self.inner.lock().draw(id, rng)
    }

    fn check_secret(&self, secret: &str) -> StoreResult<bool> {
        self.inner.lock().check_secret(secret)
    }

    fn update_secret(&self, old: &str, new: &str) -> StoreResult<()> {
        self.inner.lock().update_secret(old, new).map(|_| ())
    }
}
