//! Target backends.
//!
//! A target is one host language: a [`TypeMapping`] (static primitive and
//! template tables plus type syntax) and an emission pass that walks the
//! spec and writes output units. Targets never share mutable state; each
//! run hands a target its own [`Emission`].

pub mod python;
pub mod typescript;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bindgen::{
    GenerateError, IdentifierRules, NamingConvention, ResolutionIssue, TypeMapping, TypeResolver,
};
use crate::output::{OutputSink, OutputUnit, UnitSummary};
use crate::spec::model::flag_value_literal;
use crate::spec::{EnumSpec, EnumValues, Spec, SpecViolation};

pub use python::PythonTarget;
pub use typescript::TypeScriptTarget;

/// Banner written at the top of every generated unit.
pub const GENERATED_BANNER: &str =
    "This file is generated: Update the spec instead of editing this file directly";

/// Built-in target identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetId {
    /// TypeScript declarations plus a JavaScript runtime bridge
    #[serde(alias = "ts")]
    TypeScript,

    /// Python type stubs plus a Python runtime bridge
    #[serde(alias = "py")]
    Python,
}

impl TargetId {
    /// Every built-in target.
    pub fn all() -> [TargetId; 2] {
        [TargetId::TypeScript, TargetId::Python]
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetId::TypeScript => write!(f, "typescript"),
            TargetId::Python => write!(f, "python"),
        }
    }
}

impl std::str::FromStr for TargetId {
    type Err = TargetIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" => Ok(TargetId::TypeScript),
            "python" | "py" => Ok(TargetId::Python),
            _ => Err(TargetIdParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid target name.
#[derive(Debug, Clone)]
pub struct TargetIdParseError(pub String);

impl fmt::Display for TargetIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown target '{}'; expected 'typescript' or 'python'",
            self.0
        )
    }
}

impl std::error::Error for TargetIdParseError {}

/// Options shared by every target in a run.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Runtime module the bridge loads classes from; `None` uses the target default.
    pub bridge_module: Option<String>,
}

/// A host-language backend.
pub trait Target: Send + Sync {
    fn id(&self) -> TargetId;

    /// Type syntax and mapping tables.
    fn mapping(&self) -> &dyn TypeMapping;

    /// Short human description.
    fn description(&self) -> &'static str;

    /// Runtime module used when none is configured.
    fn default_bridge_module(&self) -> &'static str;

    /// Naming convention for members, fields, and arguments.
    fn naming(&self) -> NamingConvention {
        self.mapping().naming()
    }

    /// Rules for every identifier the target emits; validation checks
    /// collisions against these.
    fn identifiers(&self) -> IdentifierRules {
        IdentifierRules::new(self.naming())
    }

    /// Walk the spec and write every output unit through `emission`.
    fn emit(&self, spec: &Spec, emission: &mut Emission<'_>) -> Result<(), GenerateError>;
}

/// Per-run state handed to a target: its resolver and its sink.
pub struct Emission<'a> {
    /// Resolver for every type the target renders.
    pub resolver: TypeResolver<'a>,
    sink: &'a mut dyn OutputSink,
    bridge_module: String,
    units: Vec<UnitSummary>,
}

impl<'a> Emission<'a> {
    pub fn new(
        spec: &'a Spec,
        target: &'a dyn Target,
        sink: &'a mut dyn OutputSink,
        options: &EmitOptions,
    ) -> Self {
        let bridge_module = options
            .bridge_module
            .clone()
            .unwrap_or_else(|| target.default_bridge_module().to_string());

        Emission {
            resolver: TypeResolver::new(spec, target.mapping()),
            sink,
            bridge_module,
            units: Vec::new(),
        }
    }

    /// Runtime module the bridge loads from.
    pub fn bridge_module(&self) -> &str {
        &self.bridge_module
    }

    /// Start a unit.
    pub fn open(&mut self, name: &str, post_process: &[&str]) -> OutputUnit {
        self.sink.open(name, post_process)
    }

    /// Finalize a unit through the sink.
    pub fn close(&mut self, unit: OutputUnit) -> Result<(), GenerateError> {
        let name = unit.name().to_string();
        let summary = self
            .sink
            .close(unit)
            .map_err(|source| GenerateError::Output { unit: name, source })?;
        self.units.push(summary);
        Ok(())
    }

    /// Consume the emission, returning unit summaries and resolution issues.
    pub fn finish(self) -> (Vec<UnitSummary>, Vec<ResolutionIssue>) {
        (self.units, self.resolver.into_issues())
    }
}

/// Registry of available targets.
///
/// Construction never fails: every built-in target is registered up front.
pub struct TargetRegistry {
    targets: BTreeMap<TargetId, Box<dyn Target>>,
}

impl TargetRegistry {
    /// Create a registry with all built-in targets.
    pub fn new() -> Self {
        let mut registry = TargetRegistry {
            targets: BTreeMap::new(),
        };

        registry.register(Box::new(TypeScriptTarget::new()));
        registry.register(Box::new(PythonTarget::new()));

        registry
    }

    /// Register a target.
    pub fn register(&mut self, target: Box<dyn Target>) {
        self.targets.insert(target.id(), target);
    }

    /// Get a target by ID.
    pub fn get(&self, id: TargetId) -> Option<&dyn Target> {
        self.targets.get(&id).map(|t| t.as_ref())
    }

    /// Get all registered target IDs.
    pub fn ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.keys().copied()
    }

    /// Get all registered targets.
    pub fn all(&self) -> impl Iterator<Item = &dyn Target> + '_ {
        self.targets.values().map(|t| t.as_ref())
    }

    /// Get the number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a method location for issue reports: `class Session.open`.
pub(crate) fn member_location(kind: &str, owner: &str, member: &str) -> String {
    format!("{} {}.{}", kind, owner, member)
}

/// An enum member ready to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EnumMember<'s> {
    /// Plain member, valued by its own name.
    Named(&'s str),

    /// Flag member with its exact integer literal.
    Flag(&'s str, String),
}

/// Members of one enum, or the violations that make it unemittable.
pub(crate) fn enum_members<'s>(
    target: TargetId,
    name: &str,
    spec: &'s EnumSpec,
) -> Result<Vec<EnumMember<'s>>, GenerateError> {
    let mut members = Vec::new();
    let mut violations = Vec::new();

    match (&spec.values, spec.is_flag) {
        (EnumValues::Names(names), false) => {
            members.extend(names.iter().map(|n| EnumMember::Named(n.as_str())));
        }
        (EnumValues::Names(names), true) => {
            violations.extend(names.iter().map(|member| SpecViolation::FlagMemberWithoutValue {
                enum_name: name.to_string(),
                member: member.clone(),
            }));
        }
        (EnumValues::Valued(_), false) => {
            violations.push(SpecViolation::PlainEnumWithValues {
                enum_name: name.to_string(),
            });
        }
        (EnumValues::Valued(values), true) => {
            for (member, value) in values {
                match value.as_ref().map(|v| (v, flag_value_literal(v))) {
                    Some((_, Some(literal))) => members.push(EnumMember::Flag(member, literal)),
                    Some((number, None)) => violations.push(SpecViolation::FlagValueNotInteger {
                        enum_name: name.to_string(),
                        member: member.clone(),
                        value: number.to_string(),
                    }),
                    None => violations.push(SpecViolation::FlagMemberWithoutValue {
                        enum_name: name.to_string(),
                        member: member.clone(),
                    }),
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(members)
    } else {
        Err(GenerateError::InvalidSpec {
            target: target.to_string(),
            violations,
        })
    }
}
