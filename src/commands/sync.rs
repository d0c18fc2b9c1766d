//! Sync command implementation
//!
//! Runs the full mirror pipeline for every configured mirror (or the one
//! selected with `--mirror`):
//! 1. Resolve the pinned upstream revision
//! 2. Fetch the upstream checkout
//! 3. Extract, transform and emit the mirrored definitions
//! 4. Propagate renames through the project
//! 5. Remove the checkout

use anyhow::{Context, Result};
use clap::Args;
use std::time::Instant;

use manifest_mirror::output::{OutputConfig, Status};
use manifest_mirror::phases::{orchestrator, RunOptions, RunReport};
use manifest_mirror::upstream::GitUpstream;

use super::MirrorSelection;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub selection: MirrorSelection,

    /// Show what would change without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the sync command
pub fn execute(args: SyncArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    let config = args.selection.load()?;
    let jobs = config.select(args.selection.mirror.as_deref())?;

    if !args.quiet && args.dry_run {
        println!(
            "{} DRY RUN MODE - No changes will be made",
            Status::DryRun.marker(output)
        );
        println!();
    }

    for job in jobs {
        let upstream = GitUpstream::new(job.repository.clone(), job.checkout_dir());
        let options = RunOptions {
            dry_run: args.dry_run,
        };
        let report = orchestrator::run(job, &upstream, &options)
            .with_context(|| format!("Mirror '{}' failed", job.name))?;

        if !args.quiet {
            print_report(&report, args.dry_run, output);
        }
    }

    if !args.quiet {
        println!(
            "{} Done in {:.2}s",
            Status::Done.marker(output),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn print_report(report: &RunReport, dry_run: bool, output: &OutputConfig) {
    let verb = if dry_run { "would update" } else { "updated" };

    println!(
        "{} {} @ {}",
        Status::Mirror.marker(output),
        report.job,
        output.highlight(&report.revision)
    );
    println!(
        "   {} definition(s), {} rename(s)",
        report.definitions,
        report.mapping.len()
    );
    if report.output_changed {
        println!("   {} {}", verb, output.highlight(report.output.display()));
    } else {
        println!("   {} is up to date", report.output.display());
    }
    for path in &report.propagation.files_changed {
        println!("   {} {}", verb, output.highlight(path.display()));
    }
    println!();
}
