//! # Revision Resolution
//!
//! This module reads the local dependency manifest (usually `Cargo.toml`) and
//! extracts the revision the project pins the upstream dependency to. The
//! mirror pipeline always regenerates definitions from exactly that revision,
//! so the generated code and the compiled dependency cannot drift apart.
//!
//! ## Process
//!
//! 1.  **Inline Declaration**: The raw manifest text is searched for an inline
//!     declaration such as `scrypto = { git = "...", tag = "v1.0.0" }`. The
//!     first `branch`, `tag` or `rev` attribute inside the braces wins.
//!
//! 2.  **Table Declaration**: If no inline declaration matches, the manifest is
//!     parsed as TOML and the dependency tables (`[dependencies.scrypto]`,
//!     `[workspace.dependencies.scrypto]`, target-specific tables, ...) are
//!     searched for the same attributes.
//!
//! There is no default. A manifest without a pinned revision fails with
//! [`Error::Resolution`] before any network access happens.

use crate::error::{Error, Result};
use regex::Regex;
use semver::Version;
use std::fmt;
use std::fs;
use std::path::Path;

/// The kind of git reference a dependency is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Branch,
    Tag,
    Rev,
}

impl RevisionKind {
    fn from_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "branch" => Some(Self::Branch),
            "tag" => Some(Self::Tag),
            "rev" => Some(Self::Rev),
            _ => None,
        }
    }

    /// The manifest attribute name for this kind
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::Rev => "rev",
        }
    }
}

/// A resolved upstream revision, fixed for the duration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRef {
    pub kind: RevisionKind,
    pub name: String,
}

impl RevisionRef {
    pub fn new(kind: RevisionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Parse the revision as a semantic version, if it looks like one.
    ///
    /// Common tag formats: v1.0.0, 1.0.0, v1.2.3-rc1
    pub fn semver(&self) -> Option<Version> {
        let version_str = self.name.strip_prefix('v').unwrap_or(&self.name);
        Version::parse(version_str).ok()
    }
}

impl fmt::Display for RevisionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.attribute(), self.name)
    }
}

/// Resolve the pinned revision of `dependency` from the manifest at `manifest_path`.
pub fn resolve_revision(manifest_path: &Path, dependency: &str) -> Result<RevisionRef> {
    let content = fs::read_to_string(manifest_path).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to read manifest '{}': {}",
            manifest_path.display(),
            e
        ),
    })?;

    let resolved = resolve_from_str(&content, dependency)?;
    resolved.ok_or_else(|| Error::Resolution {
        dependency: dependency.to_string(),
        manifest: manifest_path.display().to_string(),
    })
}

/// Resolve the pinned revision from manifest text.
///
/// Returns `Ok(None)` when the dependency has no branch, tag or rev pin.
pub fn resolve_from_str(content: &str, dependency: &str) -> Result<Option<RevisionRef>> {
    if let Some(revision) = resolve_inline(content, dependency)? {
        log::debug!("Resolved {} from inline declaration", revision);
        return Ok(Some(revision));
    }

    let revision = resolve_table(content, dependency)?;
    if let Some(revision) = &revision {
        log::debug!("Resolved {} from dependency table", revision);
    }
    Ok(revision)
}

fn resolve_inline(content: &str, dependency: &str) -> Result<Option<RevisionRef>> {
    let declaration = Regex::new(&format!(
        r#"(?m)^\s*"?{}"?\s*=\s*\{{(?P<body>[^}}]*)\}}"#,
        regex::escape(dependency)
    ))?;
    let attribute = Regex::new(r#"\b(?P<key>branch|tag|rev)\s*=\s*"(?P<value>[^"]*)""#)?;

    for captures in declaration.captures_iter(content) {
        let body = &captures["body"];
        if let Some(pin) = attribute.captures(body) {
            let Some(kind) = RevisionKind::from_attribute(&pin["key"]) else {
                continue;
            };
            let name = pin["value"].trim();
            if !name.is_empty() {
                return Ok(Some(RevisionRef::new(kind, name)));
            }
        }
    }

    Ok(None)
}

fn resolve_table(content: &str, dependency: &str) -> Result<Option<RevisionRef>> {
    let manifest: toml::Table = toml::from_str(content)?;

    let mut tables: Vec<&toml::Table> = Vec::new();
    collect_dependency_tables(&manifest, &mut tables);
    if let Some(workspace) = manifest.get("workspace").and_then(|v| v.as_table()) {
        collect_dependency_tables(workspace, &mut tables);
    }
    if let Some(targets) = manifest.get("target").and_then(|v| v.as_table()) {
        for target in targets.values().filter_map(|v| v.as_table()) {
            collect_dependency_tables(target, &mut tables);
        }
    }

    for table in tables {
        let Some(declaration) = table.get(dependency).and_then(|v| v.as_table()) else {
            continue;
        };
        for kind in [RevisionKind::Branch, RevisionKind::Tag, RevisionKind::Rev] {
            if let Some(name) = declaration.get(kind.attribute()).and_then(|v| v.as_str()) {
                let name = name.trim();
                if !name.is_empty() {
                    return Ok(Some(RevisionRef::new(kind, name)));
                }
            }
        }
    }

    Ok(None)
}

fn collect_dependency_tables<'a>(parent: &'a toml::Table, tables: &mut Vec<&'a toml::Table>) {
    for key in ["dependencies", "dev-dependencies", "build-dependencies"] {
        if let Some(table) = parent.get(key).and_then(|v| v.as_table()) {
            tables.push(table);
        }
    }
}
