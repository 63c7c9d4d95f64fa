//! resume command - Continue an interrupted upload from a state file
//!
//! Restores the write channel from the snapshot captured when the upload
//! failed, seeks the source past the bytes the channel already holds, and
//! finishes the stream. No new session is opened.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use ul_core::WriteChannel;
use ul_http::HttpEndpoint;

use crate::commands::upload::{ResumeFile, drive_upload, progress_bar};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Continue an interrupted upload
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// State file written by a failed `ul upload --state-file`
    pub state_file: PathBuf,

    /// Keep the state file after a successful upload
    #[arg(long)]
    pub keep_state: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Serialize)]
struct ResumeOutput {
    source: String,
    target: String,
    resumed_at: u64,
    size_bytes: u64,
}

impl std::fmt::Display for ResumeOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Resumed {} at byte {} and uploaded to {}",
            self.source, self.resumed_at, self.target
        )
    }
}

/// Execute the resume command
pub async fn execute(args: ResumeArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let resume = match ResumeFile::load(&args.state_file) {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::GeneralError;
        }
    };

    if !resume.state.is_open {
        formatter.success("Upload was already finalized; nothing to resume");
        return ExitCode::Success;
    }

    let source_len = match std::fs::metadata(&resume.source) {
        Ok(meta) => meta.len(),
        Err(e) => {
            formatter.error(&format!("Cannot read {}: {e}", resume.source.display()));
            return ExitCode::NotFound;
        }
    };

    let consumed = resume.consumed();
    if source_len < consumed {
        formatter.error(&format!(
            "{} has shrunk below the {consumed} bytes already uploaded",
            resume.source.display()
        ));
        return ExitCode::UsageError;
    }

    let alias_manager = match ul_core::AliasManager::new() {
        Ok(am) => am,
        Err(e) => {
            formatter.error(&format!("Failed to load aliases: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let alias = match alias_manager.get(&resume.alias) {
        Ok(a) => a,
        Err(_) => {
            formatter.error(&format!("Alias '{}' not found", resume.alias));
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

    let target = resume.state.configuration.destination.clone();

    // Reconstruction is local; the session on the endpoint is untouched
    // until the next flush.
    let mut channel = match WriteChannel::restore(endpoint, resume.state.clone()) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to restore channel: {e}"));
            return ExitCode::from(&e);
        }
    };

    let progress = progress_bar(&formatter, args.no_progress, source_len);

    let result = drive_upload(&mut channel, &resume.source, consumed, &alias.retry, &progress).await;
    progress.finish_and_clear();

    match result {
        Ok(()) => {
            if !args.keep_state
                && let Err(e) = std::fs::remove_file(&args.state_file)
            {
                formatter.warning(&format!(
                    "Could not remove state file {}: {e}",
                    args.state_file.display()
                ));
            }
            let output = ResumeOutput {
                source: resume.source.display().to_string(),
                target: target.to_string(),
                resumed_at: consumed,
                size_bytes: source_len,
            };
            formatter.output(&output);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Resume failed: {e}"));
            if channel.is_open() {
                let refreshed = ResumeFile {
                    alias: resume.alias.clone(),
                    source: resume.source.clone(),
                    state: channel.capture(),
                };
                match refreshed.store(&args.state_file) {
                    Ok(()) => {
                        formatter.warning(&format!(
                            "State refreshed; retry with: ul resume {}",
                            args.state_file.display()
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
