//! Resolution issues and generation errors.
//!
//! Issues are non-fatal: the resolver records one whenever it emits a
//! placeholder, and generation carries on. A [`GenerateError`] aborts the
//! target it occurred in.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::validation::SpecViolation;
use crate::util::diagnostic::Diagnostic;

/// Category of a non-fatal resolution miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// A declared primitive with no rendering for the target.
    UnmappablePrimitive,
    /// A template with no mapper, or a mapper that cannot accept the arguments.
    UnmappableTemplate,
    /// A name that is neither declared nor a known primitive.
    UnresolvedIdentifier,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::UnmappablePrimitive => write!(f, "unmappable primitive"),
            IssueKind::UnmappableTemplate => write!(f, "unmappable template"),
            IssueKind::UnresolvedIdentifier => write!(f, "unresolved identifier"),
        }
    }
}

/// A placeholder emitted during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionIssue {
    pub kind: IssueKind,

    /// Original fully-qualified spec identifier.
    pub identifier: String,

    /// Entity or member being emitted when the miss happened.
    pub location: String,

    /// Extra detail, e.g. an arity mismatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for ResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.identifier)?;
        if !self.location.is_empty() {
            write!(f, " in {}", self.location)?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

/// A declared primitive or template that the target has no table entry for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum CoverageWarning {
    Primitive(String),
    Template(String),
}

impl fmt::Display for CoverageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageWarning::Primitive(name) => {
                write!(f, "spec declares an unsupported primitive: \"{}\"", name)
            }
            CoverageWarning::Template(name) => {
                write!(f, "spec declares an unsupported template instance: \"{}\"", name)
            }
        }
    }
}

/// Fatal error for one target.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GenerateError {
    #[error("spec violates {} structural invariant(s) for target `{target}`", .violations.len())]
    #[diagnostic(
        code(bindspec::generate::invalid_spec),
        help("Fix the listed entities in the spec and re-run generation")
    )]
    InvalidSpec {
        target: String,
        violations: Vec<SpecViolation>,
    },

    #[error("failed to write output unit `{unit}`")]
    #[diagnostic(
        code(bindspec::generate::output),
        help("Check that the output directory is writable")
    )]
    Output {
        unit: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to clean output directory `{}`", .path.display())]
    #[diagnostic(
        code(bindspec::generate::clean),
        help("Remove the path by hand or run without --clean")
    )]
    Clean {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl GenerateError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::InvalidSpec { target, violations } => {
                let mut diag = Diagnostic::error(format!(
                    "cannot generate `{}` bindings from an inconsistent spec",
                    target
                ));
                for violation in violations {
                    let detail = violation.to_diagnostic();
                    diag = diag.with_context(detail.message);
                    for suggestion in detail.suggestions {
                        if !diag.suggestions.contains(&suggestion) {
                            diag = diag.with_suggestion(suggestion);
                        }
                    }
                }
                diag.with_suggestion("Fix the listed entities in the spec and re-run generation")
            }
            GenerateError::Output { unit, source } => {
                Diagnostic::error(format!("failed to write `{}`: {:#}", unit, source))
                    .with_suggestion("Check that the output directory is writable")
            }
            GenerateError::Clean { path, source } => Diagnostic::error(format!(
                "failed to clean `{}`: {:#}",
                path.display(),
                source
            ))
            .with_suggestion("Remove the path by hand or run without --clean"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display() {
        let issue = ResolutionIssue {
            kind: IssueKind::UnmappableTemplate,
            identifier: "std::shared_ptr".to_string(),
            location: "record Person.friends".to_string(),
            detail: Some("expected 1 argument(s), found 2".to_string()),
        };
        assert_eq!(
            issue.to_string(),
            "unmappable template `std::shared_ptr` in record Person.friends (expected 1 argument(s), found 2)"
        );
    }

    #[test]
    fn test_invalid_spec_diagnostic_lists_violations() {
        let err = GenerateError::InvalidSpec {
            target: "typescript".to_string(),
            violations: vec![SpecViolation::FlagMemberWithoutValue {
                enum_name: "Perm".to_string(),
                member: "Exec".to_string(),
            }],
        };
        let out = err.to_diagnostic().format(false);
        assert!(out.contains("cannot generate `typescript` bindings"));
        assert!(out.contains("Perm"));
        assert!(out.contains("Exec"));
        assert!(out.contains("1. Give every member of a flag enum an explicit integer value"));
    }

    #[test]
    fn test_clean_failure_diagnostic() {
        let err = GenerateError::Clean {
            path: PathBuf::from("bindings/python"),
            source: anyhow::anyhow!("permission denied"),
        };
        assert_eq!(
            MietteDiagnostic::code(&err).map(|c| c.to_string()),
            Some("bindspec::generate::clean".to_string())
        );
        let out = err.to_diagnostic().format(false);
        assert!(out.contains("failed to clean `bindings/python`: permission denied"));
        assert!(out.contains("run without --clean"));
    }
}
