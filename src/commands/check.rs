//! # Check Command Implementation
//!
//! Runs every selected mirror in dry-run mode and fails when anything would
//! change: the generated module differs from a fresh regeneration, or a
//! project file still references an upstream identifier that has been
//! renamed. Intended for CI and pre-commit hooks.
//!
//! Exit codes:
//! - 0: everything is in sync
//! - 1: drift detected, or the check itself failed

use anyhow::{Context, Result};
use clap::Args;

use manifest_mirror::output::{OutputConfig, Status};
use manifest_mirror::phases::{orchestrator, RunOptions};
use manifest_mirror::upstream::GitUpstream;

use super::MirrorSelection;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: MirrorSelection,
}

/// Execute the check command
pub fn execute(args: CheckArgs, output: &OutputConfig) -> Result<()> {
    let config = args.selection.load()?;
    let mut stale = Vec::new();

    for job in config.select(args.selection.mirror.as_deref())? {
        let upstream = GitUpstream::new(job.repository.clone(), job.checkout_dir());
        let report = orchestrator::run(job, &upstream, &RunOptions { dry_run: true })
            .with_context(|| format!("Mirror '{}' failed", job.name))?;

        if report.has_changes() {
            println!(
                "{} {} is out of date ({})",
                Status::Stale.marker(output),
                output.warning(&report.job),
                output.highlight(&report.revision)
            );
            if report.output_changed {
                println!("   {}", output.highlight(report.output.display()));
            }
            for path in &report.propagation.files_changed {
                println!("   {}", output.highlight(path.display()));
            }
            stale.push(report.job);
        } else {
            println!(
                "{} {} is in sync ({})",
                Status::InSync.marker(output),
                report.job,
                output.highlight(&report.revision)
            );
        }
    }

    if !stale.is_empty() {
        anyhow::bail!(
            "{} mirror(s) out of date: {}. Run `manifest-mirror sync` to update.",
            stale.len(),
            stale.join(", ")
        );
    }

    Ok(())
}
