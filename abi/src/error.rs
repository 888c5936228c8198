//! Error types shared by every spinwheel crate.

use crate::entry_set::EntrySetId;

/// Why a winner removal was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RemovalRefusal {
    #[error("{count} entries are named '{name}'; remove by ticket instead")]
    AmbiguousName { name: String, count: usize },
    #[error("no entry named '{0}'")]
    NameNotFound(String),
    #[error("no entry with ticket '{0}'")]
    TicketNotFound(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WheelError {
    #[error("no entries loaded")]
    NoEntries,
    #[error("a spin is already in progress")]
    SpinInProgress,
    #[error("dismiss the current result before spinning again")]
    ResultPending,
    #[error("there is no winner to act on")]
    NoWinner,
    #[error("removal refused: {0}")]
    RemovalRefused(#[from] RemovalRefusal),
    #[error("invalid spin number {0}")]
    InvalidSpinNumber(u32),
    #[error("state storage failed: {0}")]
    State(String),
}

pub type WheelResult<T> = Result<T, WheelError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("entry set {0} not found")]
    NotFound(EntrySetId),
    #[error("no records to upload")]
    EmptyRecords,
    #[error("filename is empty")]
    EmptyFilename,
    #[error("upload is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("incorrect password")]
    WrongSecret,
    #[error("new password must be at least {min} characters")]
    SecretTooShort { min: usize },
    #[error("entry set {0} has no records")]
    NothingToDraw(EntrySetId),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for WheelError {
    fn from(err: StoreError) -> Self {
        WheelError::State(err.to_string())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("file is empty")]
    Empty,
    #[error("unsupported file type '{0}'")]
    UnsupportedFormat(String),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("unreadable workbook: {0}")]
    Workbook(String),
    #[error("image is empty")]
    EmptyImage,
}

pub type IngestResult<T> = Result<T, IngestError>;
