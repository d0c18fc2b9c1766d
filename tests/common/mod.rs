//! Shared test utilities for the CLI end-to-end tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.
//!
//! Tests that need an upstream build one with [`LocalUpstream`], a real git
//! repository in a temporary directory, so no network access is required.
//! They return early when `git` is not installed.

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, upstream_sources, LocalUpstream, TestProject};
}

/// Upstream sources mirrored by most tests.
pub mod upstream_sources {
    pub const INPUTS: &str = r#"use sbor::*;

pub struct FooInput {
    pub entries: BTreeMap<String, BarInput>,
}

pub struct FooManifestInput {
    pub names: BTreeMap<u32, String>,
}

pub struct BarInput {
    pub id: u32,
}
"#;

    pub const NOTHING_TO_MIRROR: &str = "pub struct Plain {\n    pub id: u32,\n}\n";
}

/// Returns `true` when a usable `git` binary is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// A local git repository standing in for the upstream project.
pub struct LocalUpstream {
    path: PathBuf,
}

impl LocalUpstream {
    /// Creates a repository under `root/upstream` holding `files`, committed
    /// once and tagged `tag`.
    pub fn create(root: &Path, tag: &str, files: &[(&str, &str)]) -> Self {
        let path = root.join("upstream");
        std::fs::create_dir_all(&path).expect("Failed to create upstream directory");
        git(&path, &["init", "--quiet"]);
        git(&path, &["config", "user.email", "mirror@example.com"]);
        git(&path, &["config", "user.name", "Mirror"]);
        git(&path, &["config", "commit.gpgsign", "false"]);
        for (file, content) in files {
            let full = path.join(file);
            std::fs::create_dir_all(full.parent().expect("file has a parent"))
                .expect("Failed to create upstream subdirectory");
            std::fs::write(full, content).expect("Failed to write upstream file");
        }
        git(&path, &["add", "."]);
        git(&path, &["commit", "--quiet", "-m", "upstream"]);
        git(&path, &["tag", tag]);
        Self { path }
    }

    /// `file://` URL of the repository.
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// A downstream project in a temporary directory.
///
/// The layout is `<tmp>/project` for the project itself, leaving `<tmp>`
/// free for the upstream repository and the checkout.
pub struct TestProject {
    temp_dir: assert_fs::TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("project")
            .create_dir_all()
            .expect("Failed to create project directory");
        Self { temp_dir }
    }

    /// Pins the `scrypto` dependency at `tag` in the project's Cargo.toml.
    pub fn with_pin(self, tag: &str) -> Self {
        let manifest = format!(
            r#"[package]
name = "downstream"
version = "0.1.0"

[dependencies]
scrypto = {{ git = "https://github.com/radixdlt/radixdlt-scrypto", tag = "{}" }}
"#,
            tag
        );
        self.with_file("Cargo.toml", &manifest)
    }

    /// Writes `.manifest-mirror.yaml` with a single job pointing at `upstream`.
    pub fn with_mirror(self, upstream: &LocalUpstream, extra: &str) -> Self {
        let config = format!(
            "- name: inputs\n  repository: {}\n  checkout: ../checkout\n  output: src/generated/inputs.rs\n{}",
            upstream.url(),
            extra
        );
        self.with_file(".manifest-mirror.yaml", &config)
    }

    /// Adds a project file relative to the project directory.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Root of the temporary directory (parent of the project).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The project directory.
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child("project").child(path)
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read project file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
