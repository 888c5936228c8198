//! Winner log and single-entry removal.
//!
//! Removal never touches more than one entry. A ticket identifies an entry
//! exactly; a bare name only does when it is unique in the pool.

use spinwheel_abi::{Entry, RemovalRefusal, RemovedEntry, SpinResult};
use spinwheel_lib::{klog_info, klog_warn};

use crate::entries::EntryPool;

/// Which key located the removed entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalKey {
    Ticket,
    /// Ticket missing from the pool; the unique display label matched.
    Label,
    /// Ticketless request; the unique base name matched.
    Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed {
        entry: Entry,
        position: usize,
        key: RemovalKey,
    },
    Refused(RemovalRefusal),
}

impl RemovalOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemovalOutcome::Removed { .. })
    }
}

/// A ticket is only usable as an identity when it differs from the name.
fn usable_ticket<'a>(ticket: Option<&'a str>, name: &str) -> Option<&'a str> {
    ticket
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != name.trim())
}

/// Locate the single entry a removal request refers to.
pub fn locate_for_removal(
    pool: &EntryPool,
    ticket: Option<&str>,
    name: &str,
) -> Result<(usize, RemovalKey), RemovalRefusal> {
    if let Some(ticket) = usable_ticket(ticket, name) {
        if let Some(position) = pool.index_of_ticket(ticket) {
            return Ok((position, RemovalKey::Ticket));
        }
        let matches = pool.positions_by_label(name);
        return match matches.as_slice() {
            [position] => Ok((*position, RemovalKey::Label)),
            [] => Err(RemovalRefusal::TicketNotFound(ticket.to_string())),
            many => Err(RemovalRefusal::AmbiguousName {
                name: name.trim().to_string(),
                count: many.len(),
            }),
        };
    }

    let matches = pool.positions_by_base_name(name);
    match matches.as_slice() {
        [position] => Ok((*position, RemovalKey::Name)),
        [] => Err(RemovalRefusal::NameNotFound(name.trim().to_string())),
        many => Err(RemovalRefusal::AmbiguousName {
            name: name.trim().to_string(),
            count: many.len(),
        }),
    }
}

/// A located removal that has not touched the pool or the ledger yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRemoval {
    position: usize,
    key: RemovalKey,
    entry: Entry,
    /// `None` when the ticket is already on the removed list.
    record: Option<RemovedEntry>,
}

impl PlannedRemoval {
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WinnerLedger {
    results: Vec<SpinResult>,
    removed: Vec<RemovedEntry>,
}

impl WinnerLedger {
    pub fn from_parts(results: Vec<SpinResult>, removed: Vec<RemovedEntry>) -> Self {
        Self { results, removed }
    }

    pub fn record(&mut self, result: SpinResult) {
        klog_info!(
            "ledger: spin #{} won by {}",
            result.spin_number,
            result.winning_entry
        );
        self.results.push(result);
    }

    #[inline]
    pub fn results(&self) -> &[SpinResult] {
        &self.results
    }

    pub fn last(&self) -> Option<&SpinResult> {
        self.results.last()
    }

    #[inline]
    pub fn removed(&self) -> &[RemovedEntry] {
        &self.removed
    }

    /// Locate the entry a request refers to. Nothing changes until the
    /// plan is passed to [`WinnerLedger::apply_removal`].
    pub fn plan_removal(
        &self,
        pool: &EntryPool,
        ticket: Option<&str>,
        name: &str,
    ) -> Result<PlannedRemoval, RemovalRefusal> {
        let (position, key) = locate_for_removal(pool, ticket, name)
            .inspect_err(|refusal| klog_warn!("ledger: removal refused: {}", refusal))?;
        let Some(entry) = pool.get(position) else {
            return Err(RemovalRefusal::NameNotFound(name.trim().to_string()));
        };
        let record = RemovedEntry::from_entry(entry);
        let duplicate = !record.ticket.is_empty()
            && self.removed.iter().any(|r| r.ticket == record.ticket);
        Ok(PlannedRemoval {
            position,
            key,
            entry: entry.clone(),
            record: (!duplicate).then_some(record),
        })
    }

    /// The removed list as it will read once `plan` is applied.
    pub fn removed_after(&self, plan: &PlannedRemoval) -> Vec<RemovedEntry> {
        let mut removed = self.removed.clone();
        removed.extend(plan.record.iter().cloned());
        removed
    }

    /// Take the planned entry out of `pool` and remember it. `pool` must be
    /// the one the plan was made against.
    pub fn apply_removal(&mut self, pool: &mut EntryPool, plan: PlannedRemoval) -> RemovalOutcome {
        let PlannedRemoval {
            position,
            key,
            entry,
            record,
        } = plan;
        if pool.get(position) != Some(&entry) {
            return RemovalOutcome::Refused(RemovalRefusal::NameNotFound(entry.name));
        }
        pool.remove_at(position);
        if entry.identity_ticket().is_none() {
            // Reloads filter by ticket only, so this entry comes back on reload.
            klog_warn!("ledger: '{}' has no ticket; it will reappear on reload", entry.name);
        }
        self.removed.extend(record);

        klog_info!("ledger: removed '{}' ({:?})", entry, key);
        RemovalOutcome::Removed {
            entry,
            position,
            key,
        }
    }

    /// Remove exactly one entry from `pool` and remember it.
    pub fn remove(&mut self, pool: &mut EntryPool, ticket: Option<&str>, name: &str) -> RemovalOutcome {
        match self.plan_removal(pool, ticket, name) {
            Ok(plan) => self.apply_removal(pool, plan),
            Err(refusal) => RemovalOutcome::Refused(refusal),
        }
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.removed.clear();
    }
}
