//! Implementation of the stages of a mirror run.
//!
//! ## Overview
//!
//! A run follows a strictly linear sequence:
//! 1. Revision resolution - read the pinned revision from the dependency manifest
//!    (see [`crate::version`])
//! 2. Upstream fetch - materialize a disposable checkout at that revision
//!    (see [`crate::upstream`])
//! 3. Extraction - collect matching definitions from the checkout
//! 4. Transformation - classify, substitute the container type and rename
//! 5. Emission - write the generated module
//! 6. Propagation - rewrite references to renamed identifiers in the project
//!
//! The checkout is released when the run ends, whichever way it ends.
//! Each stage depends only on the values produced by the stages before it;
//! the identifier mapping built in stage 4 is handed to stage 6 explicitly.

pub mod emit;
pub mod extract;
pub mod orchestrator;
pub mod propagate;
pub mod transform;

pub use emit::{render_module, write_module, Annotations};
pub use extract::{extract_definitions, ExtractOptions, RawDefinition};
pub use orchestrator::{run, RunOptions, RunReport};
pub use propagate::{propagate, PropagateOptions, PropagationReport, Renamer};
pub use transform::{
    Classification, DuplicatePolicy, IdentifierMapping, TransformRules, TransformedDefinition,
    Transformer,
};
