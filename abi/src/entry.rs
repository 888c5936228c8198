//! Wheel entries and the records they are built from.
//!
//! Entries stay structured everywhere inside the engine. The combined
//! `"Name (Ticket)"` label only exists at the edges: [`Entry::label`] renders
//! it and [`Entry::parse_label`] reads it back.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One uploaded spreadsheet row, or a bare string.
pub type RawRecord = serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, ticket: Option<String>) -> Self {
        let ticket = ticket
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            name: name.into(),
            ticket,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// The ticket, if it actually identifies the entry.
    ///
    /// A ticket-only record uses its ticket as the display name; such a ticket
    /// is not treated as an identity because it is indistinguishable from a
    /// name.
    pub fn identity_ticket(&self) -> Option<&str> {
        self.ticket
            .as_deref()
            .filter(|t| !t.is_empty() && *t != self.name.trim())
    }

    /// Display form, `"Name (Ticket)"` when an identity ticket exists.
    pub fn label(&self) -> String {
        match self.identity_ticket() {
            Some(ticket) => format!("{} ({})", self.name, ticket),
            None => self.name.clone(),
        }
    }

    /// Parse a `"Name (123)"` label. Any other text becomes a ticketless entry.
    pub fn parse_label(label: &str) -> Self {
        let text = label.trim();
        match split_ticket_suffix(text) {
            Some((name, ticket)) => Self::new(name, Some(ticket.to_string())),
            None => Self::named(text),
        }
    }

    /// Name with any `" (digits)"` suffix removed.
    pub fn base_name(&self) -> &str {
        split_ticket_suffix(self.name.trim())
            .map(|(name, _)| name)
            .unwrap_or_else(|| self.name.trim())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity_ticket() {
            Some(ticket) => write!(f, "{} ({})", self.name, ticket),
            None => f.write_str(&self.name),
        }
    }
}

/// Split `"Name (123)"` into `("Name", "123")`.
///
/// The ticket must be all ASCII digits and the name non-empty.
pub fn split_ticket_suffix(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let name = inner[..open].trim_end();
    if name.is_empty() {
        return None;
    }
    Some((name, digits))
}

/// Trim and lowercase, the comparison form for tickets and names.
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A removed winner, remembered so reloads can filter it out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedEntry {
    /// Normalized name.
    pub name: String,
    /// Normalized ticket, empty when the entry had none.
    pub ticket: String,
    pub original_name: String,
    pub original_ticket: String,
}

impl RemovedEntry {
    pub fn from_entry(entry: &Entry) -> Self {
        let ticket = entry.identity_ticket().unwrap_or("");
        Self {
            name: normalize_key(&entry.name),
            ticket: normalize_key(ticket),
            original_name: entry.name.clone(),
            original_ticket: ticket.to_string(),
        }
    }
}
