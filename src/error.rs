//! # Error Handling
//!
//! This module defines the centralized error type for `manifest-mirror`. It
//! uses `thiserror` to describe every failure mode of the mirroring pipeline
//! with enough context to act on the message without a debugger.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all pipeline failures, from revision resolution
//!   through propagation, plus wrapped library errors.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Errors are never recovered locally. Every stage returns them with `?` and
//! the CLI reports them through `anyhow` with a non-zero exit status.

use thiserror::Error;

/// Main error type for manifest-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `.manifest-mirror.yaml` configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The dependency declaration carrying the pinned revision was not found.
    #[error("Could not resolve a branch, tag or rev for dependency '{dependency}' in {manifest}")]
    Resolution {
        dependency: String,
        manifest: String,
    },

    /// An error occurred while cloning the upstream repository.
    ///
    /// Includes the repository URL, ref (branch/tag/rev), error message, and an
    /// optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command other than the clone.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// No definition matched in the upstream checkout and the mirror job
    /// does not allow an empty result.
    #[error("No '*{suffix}' definitions containing '{marker}' found in {root}")]
    EmptyExtraction {
        root: String,
        suffix: String,
        marker: String,
    },

    /// The same upstream identifier was extracted twice and the mirror job
    /// rejects duplicates.
    #[error("Duplicate upstream definition '{identifier}' (first seen in {first}, again in {second})")]
    DuplicateDefinition {
        identifier: String,
        first: String,
        second: String,
    },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
