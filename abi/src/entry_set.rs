use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::RawRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntrySetId(pub u64);

impl fmt::Display for EntrySetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uploaded spin file.
///
/// Field names on the wire follow the storage service's JSON layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntrySet {
    pub id: EntrySetId,
    pub filename: String,
    #[serde(rename = "data")]
    pub entries: Vec<RawRecord>,
    #[serde(rename = "picture", default)]
    pub center_image: Option<String>,
    #[serde(rename = "ticket_number", default)]
    pub pinned_ticket: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Upload payload, before the store assigns an id and timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewEntrySet {
    pub filename: String,
    pub entries: Vec<RawRecord>,
    pub center_image: Option<String>,
    pub pinned_ticket: Option<String>,
}

/// Listing row without the record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySetSummary {
    pub id: EntrySetId,
    pub filename: String,
    pub record_count: usize,
    pub active: bool,
    pub pinned_ticket: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&EntrySet> for EntrySetSummary {
    fn from(set: &EntrySet) -> Self {
        Self {
            id: set.id,
            filename: set.filename.clone(),
            record_count: set.entries.len(),
            active: set.active,
            pinned_ticket: set.pinned_ticket.clone(),
            created_at: set.created_at,
        }
    }
}
