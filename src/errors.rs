//! Error types for the extension engine and its collaborators.

use thiserror::Error;

/// Result type alias for the fallible core operations.
pub type Result<T> = std::result::Result<T, ExtendError>;

#[derive(Error, Debug)]
pub enum ExtendError {
    /// A SAM record the harvester cannot work with (empty CIGAR on a mapped
    /// record, SEQ/CIGAR length mismatch, unparseable line).
    #[error("invalid alignment record '{name}': {reason}")]
    InvalidAlignment { name: String, reason: String },

    /// Rejected configuration value, reported before any work starts.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// An aligner command could not be spawned, exited non-zero, or produced
    /// no output file; also raised when the POA engine reports an error.
    #[error("external tool '{command}' failed: {reason}")]
    AlignerFailed { command: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtendError {
    pub(crate) fn invalid_alignment(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAlignment { name: name.to_string(), reason: reason.into() }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}
