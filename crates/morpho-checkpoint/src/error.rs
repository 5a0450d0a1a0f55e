//! Error types for checkpoint encoding and restore.

use std::fmt;
use std::io;

/// Errors from writing, reading, or restoring a checkpoint.
#[derive(Debug)]
pub enum CheckpointError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The data does not start with `b"MRPH"`.
    InvalidMagic,
    /// The schema version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the data.
        found: u8,
    },
    /// The data could not be decoded (truncated or corrupt).
    Malformed {
        /// What went wrong.
        detail: String,
    },
    /// The checkpoint was taken with a different step size or model.
    Incompatible {
        /// Which setting differs.
        detail: String,
    },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"MRPH\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported checkpoint version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed checkpoint: {detail}"),
            Self::Incompatible { detail } => write!(f, "incompatible checkpoint: {detail}"),
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
