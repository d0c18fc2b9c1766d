//! Orchestrator for a complete mirror run
//!
//! This module coordinates all stages for a single mirror job and reports
//! what changed.

use std::fs;
use std::path::PathBuf;

use crate::config::{EmptyPolicy, MirrorJob};
use crate::error::{Error, Result};
use crate::upstream::UpstreamProvider;
use crate::version::{resolve_revision, RevisionRef};

use super::emit::{render_module, write_module};
use super::extract::extract_definitions;
use super::propagate::{propagate, PropagateOptions, PropagationReport, Renamer};
use super::transform::{IdentifierMapping, Transformer};

/// Options for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute everything but leave the generated module and the project untouched
    pub dry_run: bool,
}

/// The outcome of a mirror run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub job: String,
    pub revision: RevisionRef,
    /// Number of definitions extracted (duplicates included)
    pub definitions: usize,
    pub mapping: IdentifierMapping,
    pub output: PathBuf,
    /// Whether the generated module differs (or would differ) from what was on disk
    pub output_changed: bool,
    pub propagation: PropagationReport,
}

impl RunReport {
    /// True when the run changed, or would change, anything on disk.
    pub fn has_changes(&self) -> bool {
        self.output_changed || !self.propagation.files_changed.is_empty()
    }
}

/// Execute the complete mirror pipeline for `job`
///
/// 1. Resolve the pinned revision from the dependency manifest
/// 2. Fetch the upstream checkout through `upstream`
/// 3. Extract matching definitions
/// 4. Transform them and build the identifier mapping
/// 5. Render and write the generated module
/// 6. Propagate renames through the project tree
///
/// The generated module is renamed in memory before it is written, so
/// references between mirrored definitions are already final, and it is
/// skipped during propagation. The checkout is released on every exit path.
pub fn run(job: &MirrorJob, upstream: &dyn UpstreamProvider, options: &RunOptions) -> Result<RunReport> {
    log::info!("Running mirror '{}'", job.name);
    job.validate_checkout()?;

    // Stage 1: Revision resolution
    let revision = resolve_revision(&job.manifest, &job.dependency)?;
    log::info!("Resolved {} for '{}'", revision, job.dependency);

    // Stage 2: Upstream fetch
    let checkout = upstream.fetch(&revision)?;

    // Stage 3: Extraction
    let definitions = extract_definitions(checkout.root(), &job.extract_options())?;
    if definitions.is_empty() {
        match job.on_empty {
            EmptyPolicy::Error => {
                return Err(Error::EmptyExtraction {
                    root: checkout.root().display().to_string(),
                    suffix: job.suffix.clone(),
                    marker: job.source_container.clone(),
                });
            }
            EmptyPolicy::Allow => log::warn!(
                "No definitions found for mirror '{}'; the generated module will only hold the preamble",
                job.name
            ),
        }
    }

    // Stage 4: Transformation
    let transformer = Transformer::new(job.transform_rules())?;
    let (transformed, mapping) = transformer.transform_all(&definitions)?;

    // Stage 5: Emission
    let mut module = render_module(&job.preamble, &job.annotations(), &transformed);
    if !mapping.is_empty() {
        module = Renamer::new(&mapping)?.apply(&module).0;
    }
    let output_changed = fs::read_to_string(&job.output)
        .map(|existing| existing != module)
        .unwrap_or(true);
    if options.dry_run {
        log::info!("Dry run: not writing {}", job.output.display());
    } else if output_changed {
        write_module(&job.output, &module)?;
    } else {
        log::info!("{} is up to date", job.output.display());
    }

    // Stage 6: Propagation
    let propagate_options = PropagateOptions {
        extension: job.extension.clone(),
        exclude: job.exclude.clone(),
        skip: vec![job.output.clone(), checkout.root().to_path_buf()],
        dry_run: options.dry_run,
    };
    let propagation = propagate(&mapping, &job.project_root, &propagate_options)?;

    upstream.release(checkout)?;

    Ok(RunReport {
        job: job.name.clone(),
        revision,
        definitions: definitions.len(),
        mapping,
        output: job.output.clone(),
        output_changed,
        propagation,
    })
}
