//! # Output Configuration
//!
//! Controls how the CLI reports mirror runs: status markers are emoji when
//! the terminal supports color and bracketed plain text otherwise, and
//! paths and revisions are styled with `console` only when color is on.
//!
//! The following are honored, in order:
//! - `--color=never|always|auto`
//! - `NO_COLOR` (any value, see https://no-color.org/)
//! - `CLICOLOR=0` and `CLICOLOR_FORCE=1`
//! - `TERM=dumb`
//!
//! ```
//! use manifest_mirror::output::{OutputConfig, Status};
//!
//! let config = OutputConfig::from_env_and_flag("never");
//! assert_eq!(Status::Stale.marker(&config), "[STALE]");
//! ```

use console::style;
use std::env;
use std::fmt::Display;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Always,
    Never,
    Auto,
}

impl ColorChoice {
    /// Unknown values fall back to `Auto`.
    pub fn parse(flag: &str) -> Self {
        match flag.to_ascii_lowercase().as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Builds the configuration from the `--color` flag value, consulting
    /// the environment only in auto mode.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match ColorChoice::parse(color_flag) {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => detect_color_support(),
        };
        Self { use_color }
    }

    /// Styles a path or revision for display.
    pub fn highlight<D: Display>(&self, value: D) -> String {
        if self.use_color {
            style(value).cyan().to_string()
        } else {
            value.to_string()
        }
    }

    /// Styles a summary line that reports a problem.
    pub fn warning<D: Display>(&self, value: D) -> String {
        if self.use_color {
            style(value).yellow().bold().to_string()
        } else {
            value.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn detect_color_support() -> bool {
    // Presence alone disables, even when empty
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}

/// Per-line status marker printed by the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Mirror,
    InSync,
    Stale,
    Pinned,
    DryRun,
    Done,
}

impl Status {
    pub fn marker(self, config: &OutputConfig) -> &'static str {
        let (emoji_str, plain) = match self {
            Status::Mirror => ("📦", "[MIRROR]"),
            Status::InSync => ("✅", "[OK]"),
            Status::Stale => ("❌", "[STALE]"),
            Status::Pinned => ("📌", "[PIN]"),
            Status::DryRun => ("🔎", "[DRY RUN]"),
            Status::Done => ("✨", "[DONE]"),
        };
        emoji(config, emoji_str, plain)
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
