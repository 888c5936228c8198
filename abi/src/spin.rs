use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// 1-based spin counter value.
pub type SpinNumber = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinMode {
    #[default]
    Random,
    Fixed,
}

impl SpinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpinMode::Random => "random",
            SpinMode::Fixed => "fixed",
        }
    }
}

impl fmt::Display for SpinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("random") {
            Ok(SpinMode::Random)
        } else if s.eq_ignore_ascii_case("fixed") {
            Ok(SpinMode::Fixed)
        } else {
            Err(format!("unknown spin mode '{}'", s))
        }
    }
}

/// The admin's preselected outcome for one spin number.
///
/// The ticket is the identity; the name is the fallback when no ticket was
/// given or the ticket no longer matches any entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignatedWinner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl DesignatedWinner {
    pub fn by_ticket(ticket: impl Into<String>) -> Self {
        Self {
            ticket: Some(ticket.into()),
            name: String::new(),
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            ticket: None,
            name: name.into(),
        }
    }

    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            ticket: entry.identity_ticket().map(str::to_string),
            name: entry.name.clone(),
        }
    }
}

impl fmt::Display for DesignatedWinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ticket, self.name.is_empty()) {
            (Some(ticket), true) => write!(f, "ticket {}", ticket),
            (Some(ticket), false) => write!(f, "{} ({})", self.name, ticket),
            (None, _) => f.write_str(&self.name),
        }
    }
}

/// Outcome of one completed spin. Created exactly once per spin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub winning_entry: Entry,
    pub slice_index: usize,
    pub color_index: usize,
    pub spin_number: SpinNumber,
    pub timestamp: DateTime<Utc>,
}
