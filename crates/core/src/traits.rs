//! Transfer endpoint contract
//!
//! The write channel talks to the remote side exclusively through this
//! trait, keeping the core independent of any particular wire protocol. The
//! `ul-http` crate provides the production implementation; tests substitute
//! doubles.

use async_trait::async_trait;

use crate::config::UploadConfiguration;
use crate::error::Result;

/// Remote side of a resumable upload
///
/// Errors from either operation are surfaced to the channel's caller
/// unchanged; the channel neither retries nor interprets them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferEndpoint: Send + Sync {
    /// Start an upload session for the given configuration
    ///
    /// Returns the opaque session identifier that correlates all subsequent
    /// chunk writes.
    async fn open(&self, config: &UploadConfiguration) -> Result<String>;

    /// Send one chunk of the stream
    ///
    /// `buf` must contain at least `offset + length` bytes. `position` is
    /// the count of bytes already committed before this chunk. `last_chunk`
    /// tells the endpoint to finalize the session after this chunk; a
    /// zero-length last chunk is a valid stream termination.
    async fn upload_chunk(
        &self,
        session_id: &str,
        buf: &[u8],
        offset: usize,
        position: u64,
        length: usize,
        last_chunk: bool,
    ) -> Result<()>;
}
