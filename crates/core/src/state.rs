//! Captured upload state
//!
//! A snapshot of an in-flight (or finished) upload channel, complete enough
//! to reconstruct an equivalent channel later, in another process if need
//! be. Snapshots are plain values: serializable, comparable field by field,
//! and inert until handed to `WriteChannel::restore`.

use serde::{Deserialize, Serialize};

use crate::chunk::MIN_CHUNK_SIZE;
use crate::config::UploadConfiguration;
use crate::error::{Error, Result};

/// Serializable snapshot of a write channel
///
/// Two snapshots are equal when every field is equal. Session identifiers
/// are opaque tokens minted by the endpoint at `open` time, so snapshots
/// taken from two independently opened channels differ in `session_id` even
/// when everything else matches; full equality across channels only occurs
/// when the endpoint is a deterministic test double.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadState {
    /// Configuration the channel was opened with
    pub configuration: UploadConfiguration,

    /// Session identifier returned by the endpoint's `open`
    pub session_id: String,

    /// Bytes buffered but not yet flushed; absent when nothing is buffered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffered: Option<Vec<u8>>,

    /// Chunk size in effect, a positive multiple of the protocol granularity
    pub chunk_size: usize,

    /// Bytes already committed to the endpoint before the buffered bytes
    pub position: u64,

    /// Whether the channel was still open when captured
    pub is_open: bool,
}

impl UploadState {
    /// Check internal consistency before a restore
    ///
    /// Restoring from an inconsistent snapshot would silently corrupt the
    /// stream, so every rule fails fast with `Error::InvalidState`.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE || self.chunk_size % MIN_CHUNK_SIZE != 0 {
            return Err(Error::InvalidState(format!(
                "chunk size {} is not a positive multiple of {}",
                self.chunk_size, MIN_CHUNK_SIZE
            )));
        }
        if let Some(buffered) = &self.buffered {
            if buffered.len() > self.chunk_size {
                return Err(Error::InvalidState(format!(
                    "{} buffered bytes exceed chunk size {}",
                    buffered.len(),
                    self.chunk_size
                )));
            }
            if !self.is_open {
                return Err(Error::InvalidState(
                    "closed snapshot cannot carry buffered bytes".to_string(),
                ));
            }
        }
        if self.session_id.is_empty() {
            return Err(Error::InvalidState("empty session identifier".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::DEFAULT_CHUNK_SIZE;
    use crate::path::RemotePath;

    fn config() -> UploadConfiguration {
        UploadConfiguration::builder(RemotePath::new("play", "backups", "data.json")).build()
    }

    fn state() -> UploadState {
        UploadState {
            configuration: config(),
            session_id: "session-1".to_string(),
            buffered: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            position: 0,
            is_open: true,
        }
    }

    #[test]
    fn test_equality_field_by_field() {
        assert_eq!(state(), state());

        let mut other = state();
        other.position = 42;
        assert_ne!(state(), other);

        let mut other = state();
        other.session_id = "session-2".to_string();
        assert_ne!(state(), other);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut snapshot = state();
        snapshot.buffered = Some(vec![7u8; 16]);
        snapshot.position = DEFAULT_CHUNK_SIZE as u64;

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: UploadState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_validate_accepts_consistent_state() {
        assert!(state().validate().is_ok());

        let mut with_buffer = state();
        with_buffer.buffered = Some(vec![0u8; MIN_CHUNK_SIZE]);
        assert!(with_buffer.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_chunk_size() {
        let mut snapshot = state();
        snapshot.chunk_size = MIN_CHUNK_SIZE - 1;
        assert!(matches!(
            snapshot.validate(),
            Err(Error::InvalidState(_))
        ));

        snapshot.chunk_size = MIN_CHUNK_SIZE + 1;
        assert!(snapshot.validate().is_err());

        snapshot.chunk_size = 0;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_buffer() {
        let mut snapshot = state();
        snapshot.chunk_size = MIN_CHUNK_SIZE;
        snapshot.buffered = Some(vec![0u8; MIN_CHUNK_SIZE + 1]);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_closed_with_buffer() {
        let mut snapshot = state();
        snapshot.is_open = false;
        snapshot.buffered = Some(vec![1, 2, 3]);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_session() {
        let mut snapshot = state();
        snapshot.session_id = String::new();
        assert!(snapshot.validate().is_err());
    }
}
