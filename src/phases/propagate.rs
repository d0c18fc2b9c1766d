//! # Rename Propagation
//!
//! Rewrites every reference to a renamed upstream identifier across the local
//! project tree, so the project keeps compiling against the mirrored module.
//!
//! Matching is on whole identifiers: with `FooInput → FooIndexMapInput`,
//! `FooInput` and `FooInput::new` are rewritten but `FooInputExtra` and
//! `MyFooInput` are left alone. All entries of the mapping are applied in a
//! single pass, so a new identifier is never rewritten again by another entry.
//!
//! Files are visited in lexicographic order and only written when their
//! content actually changes. An empty mapping does not touch the tree at all.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::phases::extract::source_files;
use crate::phases::transform::IdentifierMapping;

/// Which files propagation may touch
#[derive(Debug, Clone, Default)]
pub struct PropagateOptions {
    /// Source file extension, without the dot
    pub extension: String,
    /// Glob patterns, relative to the project root, of files to leave alone
    pub exclude: Vec<String>,
    /// Files or directories to skip entirely, such as the generated module
    /// or a checkout placed inside the project
    pub skip: Vec<PathBuf>,
    /// Compute the changes without writing them
    pub dry_run: bool,
}

/// What propagation did to the tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub files_scanned: usize,
    /// Files whose content changed (or would change, in a dry run)
    pub files_changed: Vec<PathBuf>,
    pub replacements: usize,
}

/// Rewrites identifiers from `mapping` in every source file under `root`.
pub fn propagate(
    mapping: &IdentifierMapping,
    root: &Path,
    options: &PropagateOptions,
) -> Result<PropagationReport> {
    let mut report = PropagationReport::default();
    if mapping.is_empty() {
        log::info!("Identifier mapping is empty; nothing to propagate");
        return Ok(report);
    }

    let renamer = Renamer::new(mapping)?;
    let exclude = options
        .exclude
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for path in source_files(root, &options.extension)? {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if options.skip.iter().any(|skipped| path.starts_with(skipped))
            || exclude.iter().any(|p| p.matches_path(&relative))
        {
            log::debug!("Skipping {}", relative.display());
            continue;
        }

        report.files_scanned += 1;
        let bytes = fs::read(&path).map_err(|e| Error::Filesystem {
            message: format!("Failed to read file '{}': {}", path.display(), e),
        })?;
        let Ok(content) = String::from_utf8(bytes) else {
            log::warn!("Skipping non UTF-8 file {}", path.display());
            continue;
        };

        let (rewritten, count) = renamer.apply(&content);
        if count == 0 {
            continue;
        }

        log::debug!("{}: {} replacement(s)", relative.display(), count);
        if !options.dry_run {
            fs::write(&path, rewritten).map_err(|e| Error::Filesystem {
                message: format!("Failed to write file '{}': {}", path.display(), e),
            })?;
        }
        report.replacements += count;
        report.files_changed.push(relative);
    }

    log::info!(
        "Propagated {} rename(s): {} replacement(s) in {} of {} file(s)",
        mapping.len(),
        report.replacements,
        report.files_changed.len(),
        report.files_scanned
    );
    Ok(report)
}

/// Boundary-aware, single-pass identifier replacement
pub struct Renamer<'a> {
    mapping: &'a IdentifierMapping,
    pattern: Regex,
}

impl<'a> Renamer<'a> {
    pub fn new(mapping: &'a IdentifierMapping) -> Result<Self> {
        // Longest first, so a shorter identifier never shadows a longer one.
        let mut names: Vec<&str> = mapping.iter().map(|(old, _)| old).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternatives: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))?;
        Ok(Self { mapping, pattern })
    }

    /// Returns the rewritten text and the number of replacements.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut count = 0;
        let rewritten = self.pattern.replace_all(text, |caps: &Captures| {
            count += 1;
            let old = &caps[0];
            self.mapping.get(old).unwrap_or(old).to_string()
        });
        (rewritten.into_owned(), count)
    }
}
