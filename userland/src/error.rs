use spinwheel_abi::{IngestError, StoreError, WheelError};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Wheel(#[from] WheelError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("this command needs the admin password (--password or SPINWHEEL_PASSWORD)")]
    Unauthorized,
    #[error("spin did not finish after {0} frames")]
    Stalled(u64),
    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T> = Result<T, CliError>;
