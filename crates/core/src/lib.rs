//! ul-core: Core library for the uplink resumable upload client
//!
//! This crate provides the core functionality for the `ul` CLI, including:
//! - The chunked, resumable write channel and its captured state
//! - Alias management for upload endpoints
//! - Path parsing and resolution
//! - The TransferEndpoint trait the channel uploads through
//!
//! This crate is designed to be independent of any specific wire protocol,
//! allowing for easy testing and potential future support for other
//! transports.

pub mod alias;
pub mod channel;
pub mod chunk;
pub mod config;
pub mod error;
pub mod path;
pub mod retry;
pub mod state;
pub mod traits;

pub use alias::{Alias, AliasManager, RetryConfig};
pub use channel::WriteChannel;
pub use chunk::{ChunkBuffer, DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
pub use config::{UploadConfiguration, UploadConfigurationBuilder};
pub use error::{Error, Result};
pub use path::{ParsedPath, RemotePath, parse_path};
pub use retry::{RetryBuilder, backoff_delay, is_retryable_error, retry_with_backoff};
pub use state::UploadState;
pub use traits::TransferEndpoint;
