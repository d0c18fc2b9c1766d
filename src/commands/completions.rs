//! Completions command implementation
//!
//! Writes a `clap_complete` completion script for the requested shell to
//! stdout, e.g.
//!
//! ```bash
//! manifest-mirror completions bash > ~/.local/share/bash-completion/completions/manifest-mirror
//! manifest-mirror completions zsh > ~/.zfunc/_manifest-mirror
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

const BIN_NAME: &str = "manifest-mirror";

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, BIN_NAME, &mut io::stdout());
    Ok(())
}
