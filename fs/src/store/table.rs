use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use spinwheel_abi::{
    EntrySet, EntrySetId, NewEntrySet, RawRecord, StoreError, StoreResult,
};
use spinwheel_lib::{WheelRng, klog_info, klog_warn};

use crate::secret::{DEFAULT_SECRET, SecretDigest, validate_new_secret};

/// In-memory table of entry sets plus the admin secret.
pub struct SetTable {
    sets: BTreeMap<EntrySetId, EntrySet>,
    next_id: u64,
    secret: SecretDigest,
    rng: WheelRng,
}

impl SetTable {
    pub fn new(rng: WheelRng) -> Self {
        Self::from_parts(Vec::new(), None, rng)
    }

    /// Rebuild from persisted sets. A missing secret falls back to the
    /// default one.
    pub fn from_parts(sets: Vec<EntrySet>, secret: Option<SecretDigest>, mut rng: WheelRng) -> Self {
        let next_id = sets.iter().map(|s| s.id.0).max().unwrap_or(0) + 1;
        let secret = match secret {
            Some(secret) => secret,
            None => {
                klog_warn!("store: no admin password set, using the default");
                SecretDigest::new(DEFAULT_SECRET, &mut rng)
            }
        };
        Self {
            sets: sets.into_iter().map(|s| (s.id, s)).collect(),
            next_id,
            secret,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn secret(&self) -> &SecretDigest {
        &self.secret
    }

    pub fn list(&self, active_only: bool) -> Vec<EntrySet> {
        let mut sets: Vec<EntrySet> = self
            .sets
            .values()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect();
        sets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        sets
    }

    pub fn get(&self, id: EntrySetId) -> StoreResult<&EntrySet> {
        self.sets.get(&id).ok_or(StoreError::NotFound(id))
    }

    fn get_mut(&mut self, id: EntrySetId) -> StoreResult<&mut EntrySet> {
        self.sets.get_mut(&id).ok_or(StoreError::NotFound(id))
    }

    pub fn create(&mut self, upload: NewEntrySet, now: DateTime<Utc>) -> StoreResult<EntrySet> {
        let filename = upload.filename.trim();
        if filename.is_empty() {
            return Err(StoreError::EmptyFilename);
        }
        if upload.entries.is_empty() {
            return Err(StoreError::EmptyRecords);
        }

        let id = EntrySetId(self.next_id);
        self.next_id += 1;
        let set = EntrySet {
            id,
            filename: filename.to_string(),
            entries: upload.entries,
            center_image: upload.center_image.filter(|i| !i.is_empty()),
            pinned_ticket: clean_ticket(upload.pinned_ticket.as_deref()),
            active: true,
            created_at: now,
        };
        klog_info!(
            "store: created set {} '{}' with {} records",
            id,
            set.filename,
            set.entries.len()
        );
        self.sets.insert(id, set.clone());
        Ok(set)
    }

    pub fn delete(&mut self, id: EntrySetId) -> StoreResult<EntrySet> {
        let set = self.sets.remove(&id).ok_or(StoreError::NotFound(id))?;
        klog_info!("store: deleted set {} '{}'", id, set.filename);
        Ok(set)
    }

    pub fn toggle_active(&mut self, id: EntrySetId) -> StoreResult<bool> {
        let set = self.get_mut(id)?;
        set.active = !set.active;
        Ok(set.active)
    }

    pub fn set_pinned_ticket(&mut self, id: EntrySetId, ticket: Option<&str>) -> StoreResult<&EntrySet> {
        let set = self.get_mut(id)?;
        set.pinned_ticket = clean_ticket(ticket);
        Ok(set)
    }

    pub fn draw(&self, id: EntrySetId, rng: &mut WheelRng) -> StoreResult<(usize, RawRecord)> {
        let set = self.get(id)?;
        if set.entries.is_empty() {
            return Err(StoreError::NothingToDraw(id));
        }
        let index = rng.below(set.entries.len());
        Ok((index, set.entries[index].clone()))
    }

    pub fn check_secret(&self, secret: &str) -> StoreResult<bool> {
        if secret.is_empty() {
            return Err(StoreError::MissingField("password"));
        }
        Ok(self.secret.matches(secret))
    }

    pub fn update_secret(&mut self, old: &str, new: &str) -> StoreResult<&SecretDigest> {
        validate_new_secret(old, new)?;
        if !self.secret.matches(old) {
            return Err(StoreError::WrongSecret);
        }
        self.secret = SecretDigest::new(new, &mut self.rng);
        klog_info!("store: admin password updated");
        Ok(&self.secret)
    }

    /// Put back a digest taken from [`SetTable::secret`] before an update
    /// that could not be saved.
    pub fn restore_secret(&mut self, digest: SecretDigest) {
        self.secret = digest;
    }
}

fn clean_ticket(ticket: Option<&str>) -> Option<String> {
    ticket
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
