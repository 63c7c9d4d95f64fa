//! ul: resumable chunked uploads to object storage
//!
//! Entry point for the `ul` binary. Parses global flags and dispatches to
//! the command implementations in `commands/`.

mod commands;
mod exit_code;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputConfig;

#[derive(Parser, Debug)]
#[command(
    name = "ul",
    version,
    about = "Resumable chunked uploads to object storage",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage endpoint aliases
    Alias {
        #[command(subcommand)]
        command: commands::alias::AliasCommands,
    },

    /// Upload a local file through a resumable channel
    Upload(commands::upload::UploadArgs),

    /// Continue an interrupted upload from a state file
    Resume(commands::resume::ResumeArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_config = OutputConfig {
        json: cli.json,
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    let code = match cli.command {
        Commands::Alias { command } => commands::alias::execute(command, output_config),
        Commands::Upload(args) => commands::upload::execute(args, output_config).await,
        Commands::Resume(args) => commands::resume::execute(args, output_config).await,
        Commands::Completions(args) => {
            commands::completions::execute(args, &mut Cli::command())
        }
    };

    std::process::exit(code.code());
}
