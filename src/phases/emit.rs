//! Writing the generated module
//!
//! The generated file is owned by the mirror job: every run replaces it
//! completely. Layout:
//!
//! ```text
//! <preamble line 1>
//! <preamble line N>
//!
//! <annotation>
//! <definition>
//!
//! <annotation>
//! <definition>
//! ```

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::phases::transform::{Classification, TransformedDefinition};

/// Annotation line per classification
#[derive(Debug, Clone)]
pub struct Annotations {
    pub specific: String,
    pub general: String,
}

impl Annotations {
    pub fn for_classification(&self, classification: Classification) -> &str {
        match classification {
            Classification::Specific => &self.specific,
            Classification::General => &self.general,
        }
    }
}

/// Renders the generated module as a string.
pub fn render_module(
    preamble: &[String],
    annotations: &Annotations,
    definitions: &[TransformedDefinition],
) -> String {
    let mut blocks = Vec::with_capacity(definitions.len() + 1);
    if !preamble.is_empty() {
        blocks.push(preamble.join("\n"));
    }
    for definition in definitions {
        blocks.push(format!(
            "{}\n{}",
            annotations.for_classification(definition.classification),
            definition.to_source()
        ));
    }

    let mut module = blocks.join("\n\n");
    module.push('\n');
    module
}

/// Overwrites `path` with `content`, creating parent directories.
pub fn write_module(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }

    fs::write(path, content).map_err(|e| Error::Filesystem {
        message: format!("Failed to write file '{}': {}", path.display(), e),
    })?;

    log::info!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}
