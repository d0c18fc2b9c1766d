//! Resolve command implementation
//!
//! Prints the upstream revision each mirror is pinned to, without touching
//! the network. Useful to confirm which revision a `sync` would mirror.

use anyhow::{Context, Result};
use clap::Args;

use manifest_mirror::output::{OutputConfig, Status};
use manifest_mirror::version::resolve_revision;

use super::MirrorSelection;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub selection: MirrorSelection,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs, output: &OutputConfig) -> Result<()> {
    let config = args.selection.load()?;

    for job in config.select(args.selection.mirror.as_deref())? {
        let revision = resolve_revision(&job.manifest, &job.dependency)
            .with_context(|| format!("Mirror '{}' failed", job.name))?;

        let semver = revision
            .semver()
            .map(|v| format!(" (semver {})", v))
            .unwrap_or_default();
        println!(
            "{} {}: {} {}{}",
            Status::Pinned.marker(output),
            job.name,
            job.dependency,
            output.highlight(&revision),
            semver
        );
    }

    Ok(())
}
