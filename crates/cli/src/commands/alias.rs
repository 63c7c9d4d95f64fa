//! Alias management commands
//!
//! Aliases are named references to upload endpoints, including the base URL
//! and an optional bearer token.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use ul_core::{Alias, AliasManager, RetryBuilder};

/// Alias subcommands for managing upload endpoints
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add or update an alias
    Set(SetArgs),

    /// List all configured aliases
    List(ListArgs),

    /// Remove an alias
    Remove(RemoveArgs),
}

/// Arguments for the `alias set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Alias name (e.g., "play", "prod")
    pub name: String,

    /// Endpoint URL (e.g., `https://upload.example.com`)
    pub endpoint: String,

    /// Bearer token sent with every request
    #[arg(long)]
    pub token: Option<String>,

    /// Maximum retry attempts for transfers through this endpoint
    #[arg(long, default_value = "3")]
    pub max_attempts: u32,
}

/// Arguments for the `alias list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {}

/// Arguments for the `alias remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Alias name to remove
    pub name: String,
}

#[derive(Debug, Serialize)]
struct AliasEntry {
    name: String,
    endpoint: String,
    authenticated: bool,
    max_attempts: u32,
}

#[derive(Debug, Serialize)]
struct AliasListOutput {
    aliases: Vec<AliasEntry>,
}

/// Execute an alias subcommand
pub fn execute(command: AliasCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut manager = match AliasManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to load aliases: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match command {
        AliasCommands::Set(args) => {
            let mut alias = Alias::new(&args.endpoint);
            alias.token = args.token;
            alias.retry = RetryBuilder::new().max_attempts(args.max_attempts).build();

            if let Err(e) = manager.set(&args.name, alias) {
                formatter.error(&format!("Failed to set alias: {e}"));
                return ExitCode::from(&e);
            }
            formatter.success(&format!(
                "Alias {} -> {}",
                formatter.style_name(&args.name),
                formatter.style_url(&args.endpoint)
            ));
            ExitCode::Success
        }
        AliasCommands::List(_) => {
            let entries: Vec<AliasEntry> = manager
                .list()
                .into_iter()
                .map(|(name, alias)| AliasEntry {
                    name,
                    endpoint: alias.endpoint,
                    authenticated: alias.token.is_some(),
                    max_attempts: alias.retry.max_attempts,
                })
                .collect();

            if formatter.is_json() {
                formatter.json(&AliasListOutput { aliases: entries });
                return ExitCode::Success;
            }

            if entries.is_empty() {
                formatter.println("No aliases configured");
                return ExitCode::Success;
            }

            let mut table = comfy_table::Table::new();
            table.load_preset(comfy_table::presets::NOTHING);
            table.set_header(["NAME", "ENDPOINT", "AUTH", "RETRIES"]);
            for entry in &entries {
                table.add_row([
                    formatter.style_name(&entry.name),
                    formatter.style_url(&entry.endpoint),
                    if entry.authenticated { "token" } else { "none" }.to_string(),
                    entry.max_attempts.to_string(),
                ]);
            }
            formatter.println(&table.to_string());
            ExitCode::Success
        }
        AliasCommands::Remove(args) => {
            if let Err(e) = manager.remove(&args.name) {
                formatter.error(&format!("Failed to remove alias: {e}"));
                return ExitCode::from(&e);
            }
            formatter.success(&format!("Removed alias {}", formatter.style_name(&args.name)));
            ExitCode::Success
        }
    }
}
