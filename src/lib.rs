//! # Manifest Mirror Library
//!
//! This library mirrors type definitions from an upstream repository into a
//! local project and keeps every reference to them consistent after they are
//! renamed. It is designed to be used by the `manifest-mirror` command-line
//! tool but the pipeline can be driven directly, for example with a custom
//! [`upstream::UpstreamProvider`].
//!
//! ## Quick Example
//!
//! ```
//! use manifest_mirror::phases::{IdentifierMapping, Renamer};
//!
//! let mut mapping = IdentifierMapping::new();
//! mapping.insert("FooInput", "FooIndexMapInput");
//!
//! let renamer = Renamer::new(&mapping).unwrap();
//! let (text, count) = renamer.apply("fn f(a: FooInput, b: FooInputExtra) {}");
//! assert_eq!(text, "fn f(a: FooIndexMapInput, b: FooInputExtra) {}");
//! assert_eq!(count, 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The `.manifest-mirror.yaml` schema, a list of
//!   mirror jobs with defaults for the manifest-input mirror.
//! - **Revision Resolution (`version`)**: Reads the pinned branch, tag or rev of
//!   the upstream dependency from the project's manifest.
//! - **Upstream Checkouts (`upstream`, `git`)**: Fetches a disposable checkout
//!   at that revision and removes it when the run ends.
//! - **Phases (`phases`)**: Extraction, transformation, emission and
//!   propagation, coordinated by `phases::orchestrator`.
//!
//! ## Execution Flow
//!
//! 1.  **Resolve**: Find the pinned revision in the dependency manifest.
//! 2.  **Fetch**: Check out the upstream repository at that revision.
//! 3.  **Extract**: Collect `*Input` definitions that use the source container.
//! 4.  **Transform**: Classify, substitute the container, rename, and record the
//!     identifier mapping.
//! 5.  **Emit**: Overwrite the generated module.
//! 6.  **Propagate**: Rename every reference in the local project.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod output;
pub mod phases;
pub mod upstream;
pub mod version;
