//! upload command - Upload a local file through a resumable write channel
//!
//! The file is streamed through the channel in protocol-aligned chunks.
//! Transient flush failures are retried in place; when retries are
//! exhausted, the channel state is captured to a state file so the upload
//! can be continued later with `ul resume`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use ul_core::{
    ParsedPath, RetryConfig, UploadConfiguration, UploadState, WriteChannel, backoff_delay,
    is_retryable_error, parse_path, retry_with_backoff,
};
use ul_http::HttpEndpoint;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Read granularity for streaming the source file into the channel
const READ_BUF_SIZE: usize = 256 * 1024;

/// Upload a local file to a remote destination
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub source: PathBuf,

    /// Destination path (alias/bucket/key)
    pub target: String,

    /// Chunk size in bytes (rounded down to the protocol granularity)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Content type (guessed from the source extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Replace an existing object at the destination
    #[arg(long)]
    pub overwrite: bool,

    /// Metadata to attach (key=value format, can specify multiple)
    #[arg(short, long, value_name = "KEY=VALUE", num_args = 1..)]
    pub metadata: Vec<String>,

    /// Where to write the resumable state when the upload fails
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// On-disk state written when an upload is interrupted
///
/// Wraps the channel snapshot with enough local context (alias name and
/// source path) for `ul resume` to rebuild the endpoint and reopen the file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeFile {
    pub alias: String,
    pub source: PathBuf,
    pub state: UploadState,
}

impl ResumeFile {
    /// Bytes of the source already consumed by the channel
    pub fn consumed(&self) -> u64 {
        self.state.position + self.state.buffered.as_ref().map_or(0, Vec::len) as u64
    }

    /// Load a resume file written by a previous run
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file {}", path.display()))?;
        let file: ResumeFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse state file {}", path.display()))?;
        file.state
            .validate()
            .with_context(|| format!("state file {} is inconsistent", path.display()))?;
        Ok(file)
    }

    /// Persist to disk, replacing any previous state
    pub fn store(&self, path: &Path) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write state file {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
    chunk_size: usize,
}

impl std::fmt::Display for UploadOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Uploaded {} ({}) to {}",
            self.source, self.size_human, self.target
        )
    }
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match parse_path(&args.target) {
        Ok(ParsedPath::Remote(path)) if !path.key.is_empty() => path,
        Ok(ParsedPath::Remote(_)) => {
            formatter.error("Target must name an object: alias/bucket/key");
            return ExitCode::UsageError;
        }
        Ok(ParsedPath::Local(_)) => {
            formatter.error("Target must be a remote path: alias/bucket/key");
            return ExitCode::UsageError;
        }
        Err(e) => {
            formatter.error(&format!("Invalid target path: {e}"));
            return ExitCode::UsageError;
        }
    };

    let metadata = match parse_metadata(&args.metadata) {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let alias_manager = match ul_core::AliasManager::new() {
        Ok(am) => am,
        Err(e) => {
            formatter.error(&format!("Failed to load aliases: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let alias = match alias_manager.get(&target.alias) {
        Ok(a) => a,
        Err(_) => {
            formatter.error(&format!("Alias '{}' not found", target.alias));
            return ExitCode::NotFound;
        }
    };

    let endpoint = match HttpEndpoint::new(&alias) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            formatter.error(&format!("Failed to create endpoint: {e}"));
            return ExitCode::from(&e);
        }
    };

    let source_len = match std::fs::metadata(&args.source) {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => {
            formatter.error(&format!("{} is not a file", args.source.display()));
            return ExitCode::UsageError;
        }
        Err(e) => {
            formatter.error(&format!("Cannot read {}: {e}", args.source.display()));
            return ExitCode::NotFound;
        }
    };

    let content_type = args.content_type.clone().or_else(|| {
        mime_guess::from_path(&args.source)
            .first()
            .map(|m| m.to_string())
    });

    let mut builder = UploadConfiguration::builder(target.clone()).overwrite(args.overwrite);
    if let Some(ct) = content_type {
        builder = builder.content_type(ct);
    }
    for (key, value) in metadata {
        builder = builder.metadata(key, value);
    }
    let config = builder.build();

    // Construction failures leave no channel behind, so plain closure retry
    // applies here.
    let mut channel = match retry_with_backoff(
        &alias.retry,
        || WriteChannel::open(endpoint.clone(), config.clone()),
        is_retryable_error,
    )
    .await
    {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to open upload session: {e}"));
            return ExitCode::from(&e);
        }
    };

    if let Some(requested) = args.chunk_size {
        match channel.set_chunk_size(requested) {
            Ok(effective) if effective != requested => {
                formatter.warning(&format!("Chunk size rounded to {effective} bytes"));
            }
            Ok(_) => {}
            Err(e) => {
                formatter.error(&format!("Failed to set chunk size: {e}"));
                return ExitCode::from(&e);
            }
        }
    }

    let progress = progress_bar(&formatter, args.no_progress, source_len);

    let result = drive_upload(
        &mut channel,
        &args.source,
        0,
        &alias.retry,
        &progress,
    )
    .await;
    progress.finish_and_clear();

    match result {
        Ok(()) => {
            let output = UploadOutput {
                source: args.source.display().to_string(),
                target: target.to_string(),
                size_bytes: source_len,
                size_human: humansize::format_size(source_len, humansize::BINARY),
                chunk_size: channel.chunk_size(),
            };
            formatter.output(&output);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Upload failed: {e}"));
            if channel.is_open()
                && let Some(state_path) = &args.state_file
            {
                let resume = ResumeFile {
                    alias: target.alias.clone(),
                    source: args.source.clone(),
                    state: channel.capture(),
                };
                match resume.store(state_path) {
                    Ok(()) => {
                        formatter.warning(&format!(
                            "State saved; continue with: ul resume {}",
                            state_path.display()
                        ));
                        return ExitCode::Interrupted;
                    }
                    Err(store_err) => {
                        formatter.error(&format!("{store_err:#}"));
                    }
                }
            }
            ExitCode::from(&e)
        }
    }
}

/// Stream the source through the channel from `consumed` onward and close it
///
/// Transient errors back off and retry in place. After a failed flush the
/// channel still holds everything it accepted, so each retry re-seeks the
/// source to `position() + buffered()` and continues from there.
pub async fn drive_upload(
    channel: &mut WriteChannel,
    source: &Path,
    consumed: u64,
    retry: &RetryConfig,
    progress: &ProgressBar,
) -> ul_core::Result<()> {
    let mut file = tokio::fs::File::open(source).await?;
    file.seek(std::io::SeekFrom::Start(consumed)).await?;
    progress.set_position(consumed);

    let mut buf = vec![0u8; READ_BUF_SIZE];
    let mut attempt = 0u32;

    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        match channel.write(&buf[..read]).await {
            Ok(_) => {
                attempt = 0;
                progress.inc(read as u64);
            }
            Err(e) if is_retryable_error(&e) && attempt + 1 < retry.max_attempts => {
                attempt += 1;
                tracing::debug!(attempt, error = %e, "retrying upload after transient error");
                tokio::time::sleep(backoff_delay(retry, attempt)).await;

                let consumed = channel.position() + channel.buffered() as u64;
                file.seek(std::io::SeekFrom::Start(consumed)).await?;
                progress.set_position(consumed);
            }
            Err(e) => return Err(e),
        }
    }

    let mut attempt = 0u32;
    loop {
        match channel.close().await {
            Ok(()) => return Ok(()),
            Err(e) if is_retryable_error(&e) && attempt + 1 < retry.max_attempts => {
                attempt += 1;
                tracing::debug!(attempt, error = %e, "retrying finalize after transient error");
                tokio::time::sleep(backoff_delay(retry, attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Build the transfer progress bar, hidden in quiet/JSON modes
pub fn progress_bar(formatter: &Formatter, no_progress: bool, total: u64) -> ProgressBar {
    if no_progress || formatter.is_quiet() || formatter.is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {bytes}/{total_bytes} {bytes_per_sec} eta {eta}",
        )
        .expect("valid progress template")
        .progress_chars("=>-"),
    );
    pb
}

fn parse_metadata(pairs: &[String]) -> Result<Vec<(String, String)>, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("Invalid metadata '{pair}', expected KEY=VALUE"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ul_core::{RemotePath, UploadConfiguration};

    fn state() -> UploadState {
        UploadState {
            configuration: UploadConfiguration::builder(RemotePath::new(
                "play", "backups", "data.json",
            ))
            .build(),
            session_id: "https://upload.example.com/sessions/abc".to_string(),
            buffered: Some(vec![1, 2, 3]),
            chunk_size: ul_core::DEFAULT_CHUNK_SIZE,
            position: ul_core::DEFAULT_CHUNK_SIZE as u64,
            is_open: true,
        }
    }

    #[test]
    fn test_resume_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("upload.state");

        let resume = ResumeFile {
            alias: "play".to_string(),
            source: PathBuf::from("/data/export.json"),
            state: state(),
        };
        resume.store(&path).unwrap();

        let loaded = ResumeFile::load(&path).unwrap();
        assert_eq!(loaded.alias, resume.alias);
        assert_eq!(loaded.source, resume.source);
        assert_eq!(loaded.state, resume.state);
    }

    #[test]
    fn test_resume_file_consumed() {
        let resume = ResumeFile {
            alias: "play".to_string(),
            source: PathBuf::from("/data/export.json"),
            state: state(),
        };
        assert_eq!(resume.consumed(), ul_core::DEFAULT_CHUNK_SIZE as u64 + 3);
    }

    #[test]
    fn test_resume_file_load_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("upload.state");
        std::fs::write(&path, "not json").unwrap();
        assert!(ResumeFile::load(&path).is_err());
    }

    #[test]
    fn test_parse_metadata() {
        let parsed = parse_metadata(&["origin=nightly".to_string(), "team=data".to_string()])
            .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], ("origin".to_string(), "nightly".to_string()));

        assert!(parse_metadata(&["no-equals".to_string()]).is_err());
    }
}
