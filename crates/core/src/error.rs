//! Error types for the uplink core library
//!
//! All fallible operations in this workspace return [`Result`], which wraps
//! the [`Error`] enum defined here.

use thiserror::Error;

/// Errors that can occur across the uplink client
#[derive(Debug, Error)]
pub enum Error {
    /// Network or transport-level failure talking to the remote endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication or authorization failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Protocol-level failure: the endpoint answered, but not the way the
    /// resumable upload protocol allows
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A write was attempted on a channel that has already been closed
    #[error("Upload channel is closed")]
    ClosedChannel,

    /// Chunk size change attempted after bytes were buffered or flushed
    #[error("Chunk size is locked once the upload has started")]
    ChunkSizeLocked,

    /// A captured upload state failed validation on restore
    #[error("Invalid upload state: {0}")]
    InvalidState(String),

    /// Alias not found in the configuration
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Invalid remote or local path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for errors that do not fit the other variants
    #[error("{0}")]
    General(String),
}

/// Result type alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;
