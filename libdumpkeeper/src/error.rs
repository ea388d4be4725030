//! Error types for dumpkeeper
//!
//! Library functions return `anyhow::Result`; the variants below name the
//! conditions callers may want to tell apart after downcasting.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// An IO error
    Io(io::Error),

    /// Invalid configuration (bad env value, zero retention, ...)
    Config(String),

    /// The backup directory could not be prepared
    Setup(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Setup(msg) => write!(f, "Setup failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
