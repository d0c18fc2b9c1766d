//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `manifest-mirror` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `manifest_mirror` library.

pub mod check;
pub mod completions;
pub mod resolve;
pub mod sync;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use manifest_mirror::config::{self, Config};

/// Arguments shared by every command that reads the configuration
#[derive(Args, Debug)]
pub struct MirrorSelection {
    /// Path to the configuration file (defaults to .manifest-mirror.yaml if present)
    #[arg(short, long, value_name = "PATH", env = "MANIFEST_MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only run the mirror with this name
    #[arg(short, long, value_name = "NAME")]
    pub mirror: Option<String>,
}

impl MirrorSelection {
    /// Loads the configuration this selection points at.
    pub fn load(&self) -> Result<Config> {
        config::load(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })
    }
}
