//! Resumable write channel
//!
//! The upload state machine. Caller-supplied bytes accumulate in a
//! [`ChunkBuffer`]; each time the buffer fills, one protocol-aligned chunk is
//! flushed to the endpoint and the stream position advances. Closing the
//! channel flushes whatever remains (possibly nothing) as the final chunk.
//!
//! A channel can be captured into an [`UploadState`] at any time and later
//! restored, in this process or another, without contacting the endpoint.
//!
//! The channel is single-writer: `write`, `close`, `capture`, and
//! `set_chunk_size` must not be invoked concurrently. Each call completes
//! its buffer and position updates before returning, so callers needing
//! shared access wrap the whole channel in a mutex.

use std::sync::Arc;

use crate::chunk::{ChunkBuffer, DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::config::UploadConfiguration;
use crate::error::{Error, Result};
use crate::state::UploadState;
use crate::traits::TransferEndpoint;

/// Chunked, resumable upload channel
///
/// Failed flushes leave the buffer and position exactly as they were, so the
/// next flush trigger (a subsequent `write` or `close`) re-issues the
/// identical chunk at the identical position. Callers resuming after an
/// error recompute their source offset as `position() + buffered()`.
pub struct WriteChannel {
    endpoint: Arc<dyn TransferEndpoint>,
    config: UploadConfiguration,
    session_id: String,
    buffer: ChunkBuffer,
    position: u64,
    open: bool,
}

impl WriteChannel {
    /// Open a new upload session
    ///
    /// Calls the endpoint's `open` with the configuration. On failure no
    /// channel exists; the caller retries construction from scratch.
    pub async fn open(
        endpoint: Arc<dyn TransferEndpoint>,
        config: UploadConfiguration,
    ) -> Result<Self> {
        let session_id = endpoint.open(&config).await?;
        tracing::debug!(session = %session_id, destination = %config.destination, "upload session opened");
        Ok(Self {
            endpoint,
            config,
            session_id,
            buffer: ChunkBuffer::new(DEFAULT_CHUNK_SIZE),
            position: 0,
            open: true,
        })
    }

    /// Reconstruct a channel from a captured state
    ///
    /// Validates the snapshot and rebuilds the channel without any network
    /// call. The restored channel continues exactly where the captured one
    /// stopped.
    pub fn restore(endpoint: Arc<dyn TransferEndpoint>, state: UploadState) -> Result<Self> {
        state.validate()?;
        let mut buffer = ChunkBuffer::new(state.chunk_size);
        if let Some(buffered) = &state.buffered {
            buffer.append(buffered);
        }
        Ok(Self {
            endpoint,
            config: state.configuration,
            session_id: state.session_id,
            buffer,
            position: state.position,
            open: state.is_open,
        })
    }

    /// Append bytes to the upload, flushing full chunks as they form
    ///
    /// Accepts the entire input (the channel self-throttles by flushing, not
    /// by rejecting) and returns `src.len()`. A single call may issue zero,
    /// one, or several interior flushes. Zero-length input is a no-op
    /// returning 0.
    ///
    /// Fails with [`Error::ClosedChannel`] once the channel is closed, and
    /// with the endpoint's own error when a flush fails; in the latter case
    /// the buffered bytes and position are unchanged.
    pub async fn write(&mut self, src: &[u8]) -> Result<usize> {
        if !self.open {
            return Err(Error::ClosedChannel);
        }
        let mut written = 0;
        while written < src.len() {
            written += self.buffer.append(&src[written..]);
            if self.buffer.is_full() {
                self.flush(false).await?;
            }
        }
        Ok(written)
    }

    /// Flush any remaining bytes as the final chunk and close the channel
    ///
    /// The final flush may carry zero bytes; the endpoint treats it as the
    /// stream terminator either way. Position does not advance past the
    /// final chunk. Closing an already closed channel is a no-op. If the
    /// final flush fails the channel stays open and `close` can be retried.
    pub async fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.flush(true).await?;
        self.open = false;
        tracing::debug!(session = %self.session_id, position = self.position, "upload session finalized");
        Ok(())
    }

    /// Change the chunk size before the upload has started
    ///
    /// Rounds down to a multiple of [`MIN_CHUNK_SIZE`], never below one
    /// granule, and returns the effective size. Once any bytes have been
    /// buffered or flushed the chunk size is fixed for the life of the
    /// session and this fails with [`Error::ChunkSizeLocked`].
    pub fn set_chunk_size(&mut self, size: usize) -> Result<usize> {
        if !self.open {
            return Err(Error::ClosedChannel);
        }
        if self.position > 0 || !self.buffer.is_empty() {
            return Err(Error::ChunkSizeLocked);
        }
        let effective = (size / MIN_CHUNK_SIZE).max(1) * MIN_CHUNK_SIZE;
        self.buffer = ChunkBuffer::new(effective);
        Ok(effective)
    }

    /// Capture the channel into a serializable snapshot
    ///
    /// Buffered bytes are copied into the snapshot; the field is absent when
    /// nothing is buffered (which includes every closed channel, since close
    /// drains the buffer).
    pub fn capture(&self) -> UploadState {
        let buffered = if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.bytes().to_vec())
        };
        UploadState {
            configuration: self.config.clone(),
            session_id: self.session_id.clone(),
            buffered,
            chunk_size: self.buffer.capacity(),
            position: self.position,
            is_open: self.open,
        }
    }

    /// Whether the channel still accepts writes
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Bytes already committed to the endpoint
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes buffered locally but not yet committed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Chunk size in effect for this session
    pub fn chunk_size(&self) -> usize {
        self.buffer.capacity()
    }

    /// Session identifier returned by the endpoint at open time
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send the buffered bytes as one chunk
    ///
    /// On failure the drained bytes go straight back into the buffer and the
    /// position stays put, which keeps a failed flush retryable with
    /// identical bytes at the identical position.
    async fn flush(&mut self, last_chunk: bool) -> Result<()> {
        let chunk = self.buffer.drain();
        let length = chunk.len();
        if let Err(e) = self
            .endpoint
            .upload_chunk(&self.session_id, &chunk, 0, self.position, length, last_chunk)
            .await
        {
            self.buffer.append(&chunk);
            return Err(e);
        }
        if !last_chunk {
            self.position += length as u64;
        }
        tracing::debug!(
            session = %self.session_id,
            position = self.position,
            length,
            last_chunk,
            "flushed chunk"
        );
        Ok(())
    }
}

impl std::fmt::Debug for WriteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteChannel")
            .field("session_id", &self.session_id)
            .field("position", &self.position)
            .field("buffered", &self.buffer.len())
            .field("chunk_size", &self.buffer.capacity())
            .field("open", &self.open)
            .finish()
    }
}
