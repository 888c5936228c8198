//! Entry normalization and the lookup tables built over the pool.

use std::collections::HashMap;

use serde_json::{Map, Value};
use spinwheel_abi::{Entry, RawRecord, RemovedEntry, normalize_key, split_ticket_suffix};
use spinwheel_lib::{WheelRng, klog_debug};

/// Column names tried, in order, for a ticket number.
pub const TICKET_FIELDS: &[&str] = &[
    "Ticket Number",
    "ticket number",
    "ticketNumber",
    "Ticket",
    "ticket",
    "Ticket No",
    "ticket no",
    "TicketNo",
    "Ticket #",
    "ticket #",
    "Ticket#",
    "Ticket ID",
    "ticket id",
    "TicketId",
];

pub const FIRST_NAME_FIELDS: &[&str] = &["First Name", "first name", "firstName"];
pub const LAST_NAME_FIELDS: &[&str] = &["Last Name", "last name", "lastName"];

/// Shown when nothing could be loaded.
pub const PLACEHOLDER_NAMES: &[&str] = &[
    "Ali", "Beatriz", "Charles", "Diya", "Eric", "Fatima", "Gabriel", "Hanna",
];

/// Text of a scalar cell. Empty and non-scalar cells yield `None`.
fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn first_field(row: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| row.get(*field).and_then(cell_text))
}

fn row_ticket(row: &Map<String, Value>) -> Option<String> {
    first_field(row, TICKET_FIELDS).or_else(|| {
        row.iter()
            .filter(|(key, _)| key.to_lowercase().contains("ticket"))
            .find_map(|(_, value)| cell_text(value))
    })
}

fn row_name(row: &Map<String, Value>) -> Option<String> {
    let first = first_field(row, FIRST_NAME_FIELDS);
    let last = first_field(row, LAST_NAME_FIELDS);
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(name), None) | (None, Some(name)) => Some(name),
        (None, None) => None,
    }
}

/// Turn one raw record into an entry. `position` is 0-based.
///
/// Never fails: rows without a usable name or ticket become `"Entry {n}"`.
pub fn normalize_record(record: &RawRecord, position: usize) -> Entry {
    let fallback = || Entry::named(format!("Entry {}", position + 1));
    match record {
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return fallback();
            }
            match split_ticket_suffix(text) {
                Some((name, ticket)) => Entry::new(name, Some(ticket.to_string())),
                None => Entry::named(text),
            }
        }
        Value::Object(row) => {
            let ticket = row_ticket(row);
            match (row_name(row), ticket) {
                (Some(name), ticket) => Entry::new(name, ticket),
                (None, Some(ticket)) => Entry::new(ticket.clone(), Some(ticket)),
                (None, None) => fallback(),
            }
        }
        other => match cell_text(other) {
            Some(text) => Entry::named(text),
            None => fallback(),
        },
    }
}

/// The ordered entries on offer plus their lookup tables.
///
/// Every map is keyed by position in `entries`, so they are rebuilt whenever
/// the order changes.
#[derive(Clone, Debug, Default)]
pub struct EntryPool {
    entries: Vec<Entry>,
    name_to_ticket: HashMap<String, String>,
    ticket_to_name: HashMap<String, String>,
    ticket_to_index: HashMap<String, usize>,
}

impl EntryPool {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut pool = Self {
            entries,
            ..Self::default()
        };
        pool.rebuild_maps();
        pool
    }

    /// One entry per record, in order, minus entries whose identity ticket
    /// appears in `removed`.
    pub fn normalize(records: &[RawRecord], removed: &[RemovedEntry]) -> Self {
        let removed_tickets: Vec<&str> = removed
            .iter()
            .map(|r| r.ticket.as_str())
            .filter(|t| !t.is_empty())
            .collect();

        let mut filtered = 0usize;
        let entries: Vec<Entry> = records
            .iter()
            .enumerate()
            .map(|(i, record)| normalize_record(record, i))
            .filter(|entry| {
                let gone = entry
                    .identity_ticket()
                    .map(|t| removed_tickets.contains(&normalize_key(t).as_str()))
                    .unwrap_or(false);
                if gone {
                    filtered += 1;
                }
                !gone
            })
            .collect();

        if filtered > 0 {
            klog_debug!("entries: {} removed winners filtered out", filtered);
        }
        Self::from_entries(entries)
    }

    pub fn placeholder() -> Self {
        Self::from_entries(PLACEHOLDER_NAMES.iter().map(|n| Entry::named(*n)).collect())
    }

    fn rebuild_maps(&mut self) {
        self.name_to_ticket.clear();
        self.ticket_to_name.clear();
        self.ticket_to_index.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            let Some(ticket) = entry.identity_ticket() else {
                continue;
            };
            let key = normalize_key(ticket);
            self.name_to_ticket
                .entry(entry.name.clone())
                .or_insert_with(|| ticket.to_string());
            self.ticket_to_name
                .entry(key.clone())
                .or_insert_with(|| entry.name.clone());
            self.ticket_to_index.entry(key).or_insert(index);
        }
    }

    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// First position holding `ticket` (trim + case-insensitive).
    pub fn index_of_ticket(&self, ticket: &str) -> Option<usize> {
        self.ticket_to_index.get(&normalize_key(ticket)).copied()
    }

    pub fn ticket_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_ticket.get(name).map(String::as_str)
    }

    pub fn name_for_ticket(&self, ticket: &str) -> Option<&str> {
        self.ticket_to_name
            .get(&normalize_key(ticket))
            .map(String::as_str)
    }

    /// Positions whose base name matches `name`, ignoring case and any
    /// `"(ticket)"` suffix on either side.
    pub fn positions_by_base_name(&self, name: &str) -> Vec<usize> {
        let parsed = Entry::parse_label(name);
        let wanted = normalize_key(&parsed.name);
        if wanted.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| normalize_key(e.base_name()) == wanted)
            .map(|(i, _)| i)
            .collect()
    }

    /// Positions whose display label or plain name is exactly `label`.
    pub fn positions_by_label(&self, label: &str) -> Vec<usize> {
        let label = label.trim();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name.trim() == label || e.label() == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Map an entry seen on the wheel back to its pool position: identity
    /// ticket first, then structural equality.
    pub fn position_of(&self, entry: &Entry) -> Option<usize> {
        if let Some(ticket) = entry.identity_ticket() {
            if let Some(index) = self.index_of_ticket(ticket) {
                return Some(index);
            }
        }
        self.entries.iter().position(|e| e == entry)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Entry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.rebuild_maps();
        Some(entry)
    }

    pub fn shuffle(&mut self, rng: &mut WheelRng) {
        rng.shuffle(&mut self.entries);
        self.rebuild_maps();
    }

    pub fn sort_by_name(&mut self) {
        self.entries
            .sort_by(|a, b| normalize_key(&a.name).cmp(&normalize_key(&b.name)));
        self.rebuild_maps();
    }
}
