//! The type-mapping engine shared by every target.
//!
//! This module provides type resolution, coverage checking, and naming
//! transforms. Targets plug in through [`TypeMapping`].

pub mod coverage;
pub mod errors;
pub mod naming;
pub mod resolver;

pub use coverage::check_coverage;
pub use errors::{CoverageWarning, GenerateError, IssueKind, ResolutionIssue};
pub use naming::{IdentifierRules, NamingConvention};
pub use resolver::{entity_identifier, MappingTable, TemplateMapping, TypeMapping, TypeResolver};
