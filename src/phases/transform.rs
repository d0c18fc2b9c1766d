//! # Definition Transformation
//!
//! Turns upstream definitions into their mirrored form and records how every
//! upstream identifier was renamed.
//!
//! For each definition, in order:
//!
//! 1.  **Classification**: an identifier containing the secondary marker (for
//!     example `Manifest`) is `Specific`, anything else is `General`. The
//!     classification selects the annotation emitted above the definition.
//! 2.  **Container substitution**: every occurrence of the source container
//!     text (for example `BTreeMap`) in the body becomes the target container
//!     (for example `IndexMap`). The replacement is textual, so `MyBTreeMap`
//!     becomes `MyIndexMap` as well.
//! 3.  **Renaming**: `<Base><Suffix>` becomes `<Base><Infix><Suffix>`.
//! 4.  **Mapping**: the rename is recorded in an `IdentifierMapping`, which is
//!     returned to the caller and handed to the propagation stage.

use crate::error::{Error, Result};
use crate::phases::extract::RawDefinition;
use regex::Regex;
use std::collections::btree_map::{self, BTreeMap};
use std::path::PathBuf;

/// Which annotation a mirrored definition carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The identifier contains the secondary marker
    Specific,
    /// Everything else
    General,
}

/// How to treat an upstream identifier that was already mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Later definitions replace the mapping entry (with a warning)
    #[default]
    Overwrite,
    /// Abort the run
    Reject,
}

/// Naming and substitution rules for one mirror job
#[derive(Debug, Clone)]
pub struct TransformRules {
    pub suffix: String,
    pub infix: String,
    pub secondary_marker: String,
    pub source_container: String,
    pub target_container: String,
    pub on_duplicate: DuplicatePolicy,
}

/// A definition ready to be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedDefinition {
    pub identifier: String,
    pub classification: Classification,
    /// Visibility and keyword, carried over from upstream
    pub header: String,
    pub generics: String,
    pub body: String,
}

impl TransformedDefinition {
    /// The definition as source text, without its annotation.
    pub fn to_source(&self) -> String {
        format!(
            "{} {}{}{{{}}}",
            self.header, self.identifier, self.generics, self.body
        )
    }
}

/// Upstream identifier to mirrored identifier, in identifier order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMapping {
    entries: BTreeMap<String, String>,
}

impl IdentifierMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rename, returning the replaced target if `old` was already mapped.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) -> Option<String> {
        self.entries.insert(old.into(), new.into())
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries.get(old).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(old, new)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a IdentifierMapping {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Applies `TransformRules` to upstream definitions
pub struct Transformer {
    rules: TransformRules,
    container: Regex,
}

impl Transformer {
    pub fn new(rules: TransformRules) -> Result<Self> {
        let container = Regex::new(&regex::escape(&rules.source_container))?;
        Ok(Self { rules, container })
    }

    pub fn rules(&self) -> &TransformRules {
        &self.rules
    }

    /// Classification depends on the identifier alone.
    pub fn classify(&self, identifier: &str) -> Classification {
        if !self.rules.secondary_marker.is_empty() && identifier.contains(&self.rules.secondary_marker) {
            Classification::Specific
        } else {
            Classification::General
        }
    }

    /// Replaces every occurrence of the source container in `body`.
    pub fn substitute_container(&self, body: &str) -> String {
        self.container
            .replace_all(body, regex::NoExpand(&self.rules.target_container))
            .into_owned()
    }

    /// `<Base><Infix><Suffix>`
    pub fn derive_identifier(&self, base_identifier: &str) -> String {
        format!("{}{}{}", base_identifier, self.rules.infix, self.rules.suffix)
    }

    /// Transforms one definition and records its rename in `mapping`.
    pub fn transform(&self, raw: &RawDefinition, mapping: &mut IdentifierMapping) -> TransformedDefinition {
        let identifier = self.derive_identifier(&raw.base_identifier);
        let old = format!("{}{}", raw.base_identifier, self.rules.suffix);
        mapping.insert(old, identifier.clone());

        TransformedDefinition {
            classification: self.classify(&raw.identifier),
            header: raw.header.clone(),
            generics: raw.generics.clone(),
            body: self.substitute_container(&raw.body),
            identifier,
        }
    }

    /// Transforms all definitions in order, building the identifier mapping.
    ///
    /// Duplicate upstream identifiers are handled according to the
    /// duplicate policy; every definition is still returned.
    pub fn transform_all(
        &self,
        definitions: &[RawDefinition],
    ) -> Result<(Vec<TransformedDefinition>, IdentifierMapping)> {
        let mut mapping = IdentifierMapping::new();
        let mut first_seen: BTreeMap<&str, &PathBuf> = BTreeMap::new();
        let mut transformed = Vec::with_capacity(definitions.len());

        for raw in definitions {
            if let Some(first) = first_seen.get(raw.identifier.as_str()) {
                match self.rules.on_duplicate {
                    DuplicatePolicy::Reject => {
                        return Err(Error::DuplicateDefinition {
                            identifier: raw.identifier.clone(),
                            first: first.display().to_string(),
                            second: raw.path.display().to_string(),
                        });
                    }
                    DuplicatePolicy::Overwrite => log::warn!(
                        "Duplicate definition {} in {} overwrites the one from {}",
                        raw.identifier,
                        raw.path.display(),
                        first.display()
                    ),
                }
            } else {
                first_seen.insert(&raw.identifier, &raw.path);
            }

            let definition = self.transform(raw, &mut mapping);
            log::debug!("{} -> {}", raw.identifier, definition.identifier);
            transformed.push(definition);
        }

        Ok((transformed, mapping))
    }
}
