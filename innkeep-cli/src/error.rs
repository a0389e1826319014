//! CLI error type with stable exit codes.

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by CLI commands.
///
/// Each variant maps to a stable process exit code so scripts can
/// branch on the outcome:
///
/// - 1: semantic failure (no availability, not authorized, audit drift)
/// - 2: database lock timeout
/// - 3: data directory not found
/// - 4: invalid arguments
/// - 5: I/O error
/// - 6: library error
/// - 7: configuration error
#[derive(Debug)]
pub enum CliError {
    /// The command ran but the domain said no.
    SemanticFailure(String),
    /// The database writer slot could not be acquired in time.
    Timeout(String),
    /// The data directory does not exist.
    NoDataDirectory(PathBuf),
    /// The arguments were syntactically valid but unusable.
    InvalidArguments(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// An error bubbled up from the engine library.
    Library(innkeep::Error),
    /// The configuration could not be loaded or resolved.
    Config(String),
}

impl CliError {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SemanticFailure(_) => 1,
            Self::Timeout(_) => 2,
            Self::NoDataDirectory(_) => 3,
            Self::InvalidArguments(_) => 4,
            Self::Io(_) => 5,
            Self::Library(_) => 6,
            Self::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SemanticFailure(msg) => write!(f, "{msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::NoDataDirectory(path) => {
                write!(
                    f,
                    "data directory not found: {} (run 'innkeep init' first)",
                    path.display()
                )
            }
            Self::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Library(err) => write!(f, "{err}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<innkeep::Error> for CliError {
    fn from(err: innkeep::Error) -> Self {
        match err {
            innkeep::Error::LockTimeout { seconds } => {
                Self::Timeout(format!("database locked for more than {seconds}s"))
            }
            innkeep::Error::DataDirectoryNotFound { path } => Self::NoDataDirectory(path),
            innkeep::Error::Io(io) => Self::Io(io),
            innkeep::Error::Validation { field, message } => {
                Self::InvalidArguments(format!("{field}: {message}"))
            }
            innkeep::Error::InvalidStay {
                checkin,
                checkout,
                reason,
            } => Self::InvalidArguments(format!("stay {checkin}..{checkout}: {reason}")),
            innkeep::Error::Unauthorized { details } => Self::SemanticFailure(details),
            other => Self::Library(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Library(innkeep::Error::Serialization(err))
    }
}
