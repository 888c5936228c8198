//! The `spinwheel` command line front end.
//!
//! Every invocation opens the data directory, rebuilds the wheel from the
//! active entry sets and persisted state, runs one command and exits.

pub mod cli;
pub mod commands;
pub mod error;
pub mod session;


pub use cli::{Cli, Command};
pub use commands::run;
pub use error::{CliError, CliResult};
pub use session::{FrameClock, Session, build_config};
