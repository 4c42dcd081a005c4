//! bindspec - A binding generator for native API specs
//!
//! This crate turns a language-neutral description of a native API surface
//! into declarations for one or more host languages, degrading to visible
//! placeholders wherever a target cannot express a construct.

pub mod bindgen;
pub mod ops;
pub mod output;
pub mod spec;
pub mod targets;
pub mod util;

/// Spec fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use bindgen::{GenerateError, ResolutionIssue, TypeResolver};
pub use ops::{generate, GenerateOptions, GenerationReport};
pub use spec::{load_spec, Spec, TypeSpec};
pub use targets::{Target, TargetId, TargetRegistry};
