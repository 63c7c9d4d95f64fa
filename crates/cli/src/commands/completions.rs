//! completions command - Generate shell completion scripts

use clap::Args;

use crate::exit_code::ExitCode;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs, cmd: &mut clap::Command) -> ExitCode {
    clap_complete::generate(args.shell, cmd, "ul", &mut std::io::stdout());
    ExitCode::Success
}
