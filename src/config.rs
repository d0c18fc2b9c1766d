//! # Configuration Schema and Parsing
//!
//! This module defines the `.manifest-mirror.yaml` configuration file: a list
//! of mirror jobs, each describing where definitions come from, how they are
//! recognized and renamed, and where the generated module is written.
//!
//! ```yaml
//! - name: manifest-inputs
//!   dependency: scrypto
//!   repository: https://github.com/radixdlt/radixdlt-scrypto
//!   output: src/models/manifest/inputs.rs
//!   exclude: ["generated/**"]
//!   on_empty: error
//! ```
//!
//! Every field except `name` is optional and defaults to the manifest-input
//! mirroring job (see [`crate::defaults`]). Relative paths are resolved
//! against the directory containing the configuration file.
//!
//! When no configuration file exists and none was requested explicitly, a
//! single default job rooted at the current directory is used.

use crate::defaults;
use crate::error::{Error, Result};
use crate::phases::emit::Annotations;
use crate::phases::extract::ExtractOptions;
use crate::phases::transform::{DuplicatePolicy, TransformRules};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// How to treat an upstream checkout without any matching definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Emit a preamble-only module (with a warning)
    #[default]
    Allow,
    /// Abort the run
    Error,
}

/// Annotation lines emitted above each definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Used when the identifier contains the secondary marker
    #[serde(default = "default_specific_annotation")]
    pub specific: String,
    /// Used for every other definition
    #[serde(default = "default_general_annotation")]
    pub general: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            specific: default_specific_annotation(),
            general: default_general_annotation(),
        }
    }
}

/// One mirror job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorJob {
    /// Unique job name, also used for the checkout directory
    pub name: String,
    /// Dependency whose pinned revision selects the upstream revision
    #[serde(default = "default_dependency")]
    pub dependency: String,
    /// Upstream repository URL (or local path)
    #[serde(default = "default_repository")]
    pub repository: String,
    /// Dependency manifest declaring the pin
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// Where the upstream checkout is materialized
    #[serde(default)]
    pub checkout: Option<PathBuf>,
    /// Generated module path
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Root of the tree renames are propagated through
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    /// Source file extension, upstream and local
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_infix")]
    pub infix: String,
    #[serde(default = "default_secondary_marker")]
    pub secondary_marker: String,
    #[serde(default = "default_source_container")]
    pub source_container: String,
    #[serde(default = "default_target_container")]
    pub target_container: String,
    #[serde(default)]
    pub annotations: AnnotationConfig,
    /// Import lines written at the top of the generated module
    #[serde(default = "default_preamble")]
    pub preamble: Vec<String>,
    /// Glob patterns (relative to the project root) excluded from propagation
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
    #[serde(default)]
    pub on_empty: EmptyPolicy,
}

impl MirrorJob {
    /// A job with every default and the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency: default_dependency(),
            repository: default_repository(),
            manifest: default_manifest(),
            checkout: None,
            output: default_output(),
            project_root: default_project_root(),
            extension: default_extension(),
            keywords: default_keywords(),
            suffix: default_suffix(),
            infix: default_infix(),
            secondary_marker: default_secondary_marker(),
            source_container: default_source_container(),
            target_container: default_target_container(),
            annotations: AnnotationConfig::default(),
            preamble: default_preamble(),
            exclude: Vec::new(),
            on_duplicate: DuplicatePolicy::default(),
            on_empty: EmptyPolicy::default(),
        }
    }

    /// Makes every relative path absolute against `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else if path == Path::new(".") {
                base_dir.to_path_buf()
            } else {
                base_dir.join(path)
            }
        };
        self.manifest = resolve(&self.manifest);
        self.output = resolve(&self.output);
        self.project_root = resolve(&self.project_root);
        self.checkout = Some(match &self.checkout {
            Some(path) => resolve(path),
            None => defaults::default_checkout_root().join(&self.name),
        });
    }

    /// Checkout directory; only meaningful after `resolve_paths`.
    pub fn checkout_dir(&self) -> PathBuf {
        self.checkout
            .clone()
            .unwrap_or_else(|| defaults::default_checkout_root().join(&self.name))
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            extension: self.extension.clone(),
            keywords: self.keywords.clone(),
            suffix: self.suffix.clone(),
            marker: self.source_container.clone(),
        }
    }

    pub fn transform_rules(&self) -> TransformRules {
        TransformRules {
            suffix: self.suffix.clone(),
            infix: self.infix.clone(),
            secondary_marker: self.secondary_marker.clone(),
            source_container: self.source_container.clone(),
            target_container: self.target_container.clone(),
            on_duplicate: self.on_duplicate,
        }
    }

    pub fn annotations(&self) -> Annotations {
        Annotations {
            specific: self.annotations.specific.clone(),
            general: self.annotations.general.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("dependency", &self.dependency),
            ("repository", &self.repository),
            ("extension", &self.extension),
            ("suffix", &self.suffix),
            ("infix", &self.infix),
            ("source_container", &self.source_container),
            ("target_container", &self.target_container),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("Mirror '{}': '{}' must not be empty", self.name, field),
                    hint: None,
                });
            }
        }

        let mut components = Path::new(&self.name).components();
        let single_component = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !single_component || self.name.contains(['/', '\\']) {
            return Err(Error::ConfigParse {
                message: format!("Invalid mirror name '{}'", self.name),
                hint: Some(
                    "The name is used as a directory name: no path separators, '.' or '..'"
                        .to_string(),
                ),
            });
        }

        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?;
        for (field, value) in [
            ("suffix", &self.suffix),
            ("infix", &self.infix),
            ("source_container", &self.source_container),
            ("target_container", &self.target_container),
        ] {
            if !identifier.is_match(value) {
                return Err(Error::ConfigParse {
                    message: format!(
                        "Mirror '{}': '{}' must be an identifier, got '{}'",
                        self.name, field, value
                    ),
                    hint: None,
                });
            }
        }

        if self.keywords.is_empty() {
            return Err(Error::ConfigParse {
                message: format!("Mirror '{}': 'keywords' must not be empty", self.name),
                hint: Some("Use keywords: [struct]".to_string()),
            });
        }

        validate_repository(&self.name, &self.repository)
    }
}

impl MirrorJob {
    /// Rejects a checkout directory that would contain the project.
    ///
    /// The checkout is deleted before every clone and after every run, so it
    /// must never be the project root, the manifest, the output module or
    /// any of their ancestors. Expects resolved paths.
    pub fn validate_checkout(&self) -> Result<()> {
        let checkout = normalize(&self.checkout_dir());
        let protected = [
            ("project_root", &self.project_root),
            ("manifest", &self.manifest),
            ("output", &self.output),
        ];
        for (field, path) in protected {
            if normalize(path).starts_with(&checkout) {
                return Err(Error::ConfigParse {
                    message: format!(
                        "Mirror '{}': checkout '{}' contains the {} '{}'",
                        self.name,
                        checkout.display(),
                        field,
                        path.display()
                    ),
                    hint: Some(
                        "The checkout is deleted after every run; point it at a dedicated directory"
                            .to_string(),
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn validate_repository(name: &str, repository: &str) -> Result<()> {
    if url::Url::parse(repository).is_ok() {
        return Ok(());
    }
    let scp_like = Regex::new(r"^[\w.-]+@[\w.-]+:")?;
    if scp_like.is_match(repository) || Path::new(repository).exists() {
        return Ok(());
    }
    Err(Error::ConfigParse {
        message: format!("Mirror '{}': invalid repository '{}'", name, repository),
        hint: Some(
            "Use a URL (https://..., file://...), an scp-style address (git@host:org/repo) \
             or an existing local path"
                .to_string(),
        ),
    })
}

/// A loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub jobs: Vec<MirrorJob>,
    /// Directory relative paths were resolved against
    pub base_dir: PathBuf,
}

impl Config {
    /// The single default job, rooted at `base_dir`.
    pub fn default_in(base_dir: &Path) -> Self {
        let mut job = MirrorJob::named(defaults::JOB_NAME);
        job.resolve_paths(base_dir);
        Self {
            jobs: vec![job],
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Jobs to run: all of them, or the one called `name`.
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&MirrorJob>> {
        match name {
            None => Ok(self.jobs.iter().collect()),
            Some(name) => {
                let job = self.jobs.iter().find(|j| j.name == name).ok_or_else(|| {
                    let known: Vec<&str> = self.jobs.iter().map(|j| j.name.as_str()).collect();
                    Error::ConfigParse {
                        message: format!("No mirror named '{}'", name),
                        hint: Some(format!("Configured mirrors: {}", known.join(", "))),
                    }
                })?;
                Ok(vec![job])
            }
        }
    }
}

/// Parses configuration YAML into validated mirror jobs.
pub fn parse(yaml_content: &str) -> Result<Vec<MirrorJob>> {
    let jobs: Vec<MirrorJob> = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("The file must be a YAML list of mirror jobs, each with a 'name'".to_string()),
    })?;

    if jobs.is_empty() {
        return Err(Error::ConfigParse {
            message: "No mirror jobs configured".to_string(),
            hint: None,
        });
    }

    let mut names = HashSet::new();
    for job in &jobs {
        job.validate()?;
        if !names.insert(job.name.as_str()) {
            return Err(Error::ConfigParse {
                message: format!("Duplicate mirror name '{}'", job.name),
                hint: None,
            });
        }
    }

    Ok(jobs)
}

/// Loads and resolves a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("Failed to read '{}': {}", path.display(), e),
        hint: None,
    })?;

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    let mut jobs = parse(&content)?;
    for job in &mut jobs {
        job.resolve_paths(&base_dir);
        job.validate_checkout()?;
    }
    Ok(Config { jobs, base_dir })
}

/// Loads `explicit` if given, else `.manifest-mirror.yaml` from the current
/// directory, else the default job.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return from_file(path);
    }

    let cwd = std::env::current_dir()?;
    let default_path = cwd.join(defaults::CONFIG_FILE);
    if default_path.exists() {
        from_file(default_path)
    } else {
        log::debug!("No {} found, using the default mirror job", defaults::CONFIG_FILE);
        Ok(Config::default_in(&cwd))
    }
}

fn default_dependency() -> String {
    defaults::DEPENDENCY.to_string()
}

fn default_repository() -> String {
    defaults::REPOSITORY.to_string()
}

fn default_manifest() -> PathBuf {
    PathBuf::from(defaults::MANIFEST)
}

fn default_output() -> PathBuf {
    PathBuf::from(defaults::OUTPUT)
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    defaults::EXTENSION.to_string()
}

fn default_keywords() -> Vec<String> {
    vec![defaults::KEYWORD.to_string()]
}

fn default_suffix() -> String {
    defaults::SUFFIX.to_string()
}

fn default_infix() -> String {
    defaults::INFIX.to_string()
}

fn default_secondary_marker() -> String {
    defaults::SECONDARY_MARKER.to_string()
}

fn default_source_container() -> String {
    defaults::SOURCE_CONTAINER.to_string()
}

fn default_target_container() -> String {
    defaults::TARGET_CONTAINER.to_string()
}

fn default_specific_annotation() -> String {
    defaults::SPECIFIC_ANNOTATION.to_string()
}

fn default_general_annotation() -> String {
    defaults::GENERAL_ANNOTATION.to_string()
}

fn default_preamble() -> Vec<String> {
    defaults::PREAMBLE.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_job_uses_defaults() {
        let jobs = parse("- name: inputs\n").unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.dependency, "scrypto");
        assert_eq!(job.suffix, "Input");
        assert_eq!(job.infix, "IndexMap");
        assert_eq!(job.source_container, "BTreeMap");
        assert_eq!(job.target_container, "IndexMap");
        assert_eq!(job.preamble.len(), 3);
        assert_eq!(job.on_duplicate, DuplicatePolicy::Overwrite);
        assert_eq!(job.on_empty, EmptyPolicy::Allow);
    }

    #[test]
    fn test_parse_full_job() {
        let yaml = r##"
- name: fixtures
  dependency: radix-engine
  repository: git@github.com:radixdlt/radixdlt-scrypto.git
  output: tests/fixtures/generated.rs
  suffix: Fixture
  infix: Ordered
  secondary_marker: Manifest
  source_container: HashMap
  target_container: IndexMap
  annotations:
    general: "#[derive(Debug)]"
  preamble: ["use indexmap::IndexMap;"]
  exclude: ["target/**"]
  on_duplicate: reject
  on_empty: error
"##;
        let jobs = parse(yaml).unwrap();
        let job = &jobs[0];
        assert_eq!(job.suffix, "Fixture");
        assert_eq!(job.annotations.general, "#[derive(Debug)]");
        assert_eq!(job.annotations.specific, defaults::SPECIFIC_ANNOTATION);
        assert_eq!(job.on_duplicate, DuplicatePolicy::Reject);
        assert_eq!(job.on_empty, EmptyPolicy::Error);
        assert_eq!(job.exclude, vec!["target/**".to_string()]);
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let err = parse("- name: inputs\n  sufix: Input\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_rejects_duplicate_names() {
        let err = parse("- name: a\n- name: a\n").unwrap_err();
        assert!(err.to_string().contains("Duplicate mirror name 'a'"));
    }

    #[test]
    fn test_parse_rejects_empty_list() {
        assert!(parse("[]").is_err());
    }

    #[test]
    fn test_parse_rejects_non_identifier_infix() {
        let err = parse("- name: a\n  infix: Index Map\n").unwrap_err();
        assert!(err.to_string().contains("'infix' must be an identifier"));
    }

    #[test]
    fn test_parse_rejects_invalid_repository() {
        let err = parse("- name: a\n  repository: not a repo\n").unwrap_err();
        assert!(err.to_string().contains("invalid repository"));
        assert!(err.to_string().contains("hint:"));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".manifest-mirror.yaml");
        std::fs::write(&config_path, "- name: inputs\n  checkout: .checkout\n").unwrap();

        let config = from_file(&config_path).unwrap();
        let job = &config.jobs[0];
        assert_eq!(job.manifest, temp_dir.path().join("Cargo.toml"));
        assert_eq!(job.output, temp_dir.path().join(defaults::OUTPUT));
        assert_eq!(job.project_root, temp_dir.path());
        assert_eq!(job.checkout_dir(), temp_dir.path().join(".checkout"));
    }

    #[test]
    fn test_default_checkout_is_per_job() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default_in(temp_dir.path());
        assert!(config.jobs[0].checkout_dir().ends_with(defaults::JOB_NAME));
    }

    #[test]
    fn test_select_unknown_mirror() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default_in(temp_dir.path());
        assert_eq!(config.select(None).unwrap().len(), 1);
        assert_eq!(config.select(Some(defaults::JOB_NAME)).unwrap().len(), 1);

        let err = config.select(Some("nope")).unwrap_err();
        assert!(err.to_string().contains(defaults::JOB_NAME));
    }

    #[test]
    fn test_parse_rejects_path_like_names() {
        for name in ["..", ".", "a/b", "../cache", "/abs"] {
            let yaml = format!("- name: \"{}\"\n", name);
            let err = parse(&yaml).unwrap_err();
            assert!(
                err.to_string().contains("Invalid mirror name"),
                "{} should be rejected",
                name
            );
        }
        assert!(parse("- name: manifest-inputs.v2\n").is_ok());
    }

    #[test]
    fn test_from_file_rejects_checkout_containing_project() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".manifest-mirror.yaml");

        for checkout in [".", "..", "src/..", "src"] {
            std::fs::write(
                &config_path,
                format!("- name: inputs\n  checkout: \"{}\"\n", checkout),
            )
            .unwrap();
            let err = from_file(&config_path).unwrap_err();
            assert!(
                err.to_string().contains("contains the"),
                "checkout {} should be rejected: {}",
                checkout,
                err
            );
        }
        assert!(temp_dir.path().join(".manifest-mirror.yaml").exists());
    }

    #[test]
    fn test_checkout_beside_project_is_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let config_path = project.join(".manifest-mirror.yaml");
        std::fs::write(&config_path, "- name: inputs\n  checkout: ../checkout\n").unwrap();

        let config = from_file(&config_path).unwrap();
        assert_eq!(normalize(&config.jobs[0].checkout_dir()), temp_dir.path().join("checkout"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_file("/nonexistent/.manifest-mirror.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }
}
