//! Default values for manifest-mirror configuration.
//!
//! The defaults describe the manifest-input mirroring job: `*Input` structs
//! from the Scrypto repository that hold a `BTreeMap` are mirrored as
//! `*IndexMapInput` structs holding an `IndexMap`.

use std::path::PathBuf;

/// Configuration file looked up in the current directory
pub const CONFIG_FILE: &str = ".manifest-mirror.yaml";

pub const JOB_NAME: &str = "manifest-inputs";
pub const DEPENDENCY: &str = "scrypto";
pub const REPOSITORY: &str = "https://github.com/radixdlt/radixdlt-scrypto";
pub const MANIFEST: &str = "Cargo.toml";
pub const OUTPUT: &str = "src/models/manifest/inputs.rs";
pub const EXTENSION: &str = "rs";
pub const KEYWORD: &str = "struct";
pub const SUFFIX: &str = "Input";
pub const INFIX: &str = "IndexMap";
pub const SECONDARY_MARKER: &str = "Manifest";
pub const SOURCE_CONTAINER: &str = "BTreeMap";
pub const TARGET_CONTAINER: &str = "IndexMap";
pub const SPECIFIC_ANNOTATION: &str = "#[derive(ManifestSbor, Clone, Debug)]";
pub const GENERAL_ANNOTATION: &str = "#[derive(ScryptoSbor, Clone, Debug)]";
pub const PREAMBLE: &[&str] = &[
    "use radix_engine_common::prelude::*;",
    "use scrypto::api::node_modules::metadata::*;",
    "use scrypto::prelude::*;",
];

/// Returns the directory upstream checkouts are placed under.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/manifest-mirror` (XDG Base Directory)
/// - macOS: `~/Library/Caches/manifest-mirror`
/// - Windows: `{FOLDERID_LocalAppData}\manifest-mirror`
///
/// Falls back to `.manifest-mirror-checkouts` in the current directory if the
/// platform cache directory cannot be determined.
pub fn default_checkout_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("manifest-mirror"))
        .unwrap_or_else(|| PathBuf::from(".manifest-mirror-checkouts"))
}
