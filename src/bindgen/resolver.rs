//! Type resolution: spec type expressions → target type syntax.
//!
//! The resolver is shared by every target. Targets only contribute a
//! [`TypeMapping`]: static primitive and template tables plus a handful of
//! syntax hooks. Adding a target never touches this file.
//!
//! Resolution never fails. Anything the target cannot express becomes a
//! placeholder that is valid target syntax and contains the original
//! identifier, and a [`ResolutionIssue`] is recorded for the report.

use std::collections::HashSet;

use crate::bindgen::errors::{IssueKind, ResolutionIssue};
use crate::bindgen::naming::NamingConvention;
use crate::spec::{ArgumentSpec, FunctionType, QualifiedName, Spec, TemplateInstance, TypeSpec};

/// Rendering strategy for one template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateMapping {
    /// Number of type arguments the template takes.
    pub arity: usize,

    /// Build the rendering from already-resolved arguments.
    pub render: fn(&[String]) -> String,
}

/// Closed, statically registered tables for one target.
#[derive(Debug)]
pub struct MappingTable {
    pub primitives: &'static [(&'static str, &'static str)],
    pub templates: &'static [(&'static str, TemplateMapping)],
}

impl MappingTable {
    pub fn primitive(&self, name: &str) -> Option<&'static str> {
        self.primitives
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, rendered)| *rendered)
    }

    pub fn template(&self, name: &str) -> Option<&'static TemplateMapping> {
        // `templates` is 'static, so the borrow outlives `self`.
        let templates: &'static [(&'static str, TemplateMapping)] = self.templates;
        templates.iter().find(|(n, _)| *n == name).map(|(_, m)| m)
    }

    pub fn primitive_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.primitives.iter().map(|(n, _)| *n)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.iter().map(|(n, _)| *n)
    }
}

/// Target-specific type syntax.
pub trait TypeMapping: Send + Sync {
    /// The target's primitive and template tables.
    fn table(&self) -> &'static MappingTable;

    /// Naming convention for argument names inside rendered signatures.
    fn naming(&self) -> NamingConvention;

    /// Reference to a declared entity.
    fn declared(&self, name: &str) -> String {
        entity_identifier(name)
    }

    /// Read-only wrapper around an already rendered type.
    fn readonly(&self, inner: &str) -> String;

    /// A function type from rendered `(name, type)` arguments and return type.
    fn function(&self, arguments: &[(String, String)], ret: &str) -> String;

    /// Attach modifiers the type system cannot express. `modifiers` is never empty.
    fn annotate(&self, rendered: &str, modifiers: &[&str]) -> String;

    /// A visible, greppable stand-in. `detail` carries the original identifier.
    fn placeholder(&self, detail: &str) -> String;
}

/// Target-side identifier for a declared entity name (`a::B` → `a_B`).
pub fn entity_identifier(name: &str) -> String {
    name.replace("::", "_")
}

/// Resolves type expressions for one target over one spec.
pub struct TypeResolver<'a> {
    spec: &'a Spec,
    mapping: &'a dyn TypeMapping,
    declared: HashSet<&'a str>,
    location: String,
    issues: Vec<ResolutionIssue>,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver. Declared identifiers are indexed once up front.
    pub fn new(spec: &'a Spec, mapping: &'a dyn TypeMapping) -> Self {
        let declared = spec
            .declared_identifiers()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        TypeResolver {
            spec,
            mapping,
            declared,
            location: String::new(),
            issues: Vec::new(),
        }
    }

    /// The spec being resolved against.
    pub fn spec(&self) -> &'a Spec {
        self.spec
    }

    /// Set the entity/member recorded on subsequent issues.
    pub fn at(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Issues recorded so far.
    pub fn issues(&self) -> &[ResolutionIssue] {
        &self.issues
    }

    /// Consume the resolver, returning the recorded issues.
    pub fn into_issues(self) -> Vec<ResolutionIssue> {
        self.issues
    }

    /// Render a type expression.
    pub fn resolve(&mut self, ty: &TypeSpec) -> String {
        if ty.is_const() {
            let inner = self.resolve(&ty.with_const(false));
            return self.mapping.readonly(&inner);
        }

        match ty {
            TypeSpec::QualifiedName(name) => self.resolve_name(name),
            TypeSpec::TemplateInstance(instance) => self.resolve_template(instance),
            TypeSpec::Function(function) => self.resolve_function(function),
        }
    }

    /// Render `(name, type)` pairs for a signature, converting argument names.
    pub fn resolve_arguments(&mut self, arguments: &[ArgumentSpec]) -> Vec<(String, String)> {
        arguments
            .iter()
            .map(|arg| (self.mapping.naming().apply(&arg.name), self.resolve(&arg.ty)))
            .collect()
    }

    fn resolve_name(&mut self, name: &QualifiedName) -> String {
        let rendered = self.render_name(name);

        // Const is stripped before we get here; only indirection remains.
        let modifiers = TypeSpec::QualifiedName(name.clone()).modifier_names();
        if modifiers.is_empty() {
            rendered
        } else {
            self.mapping.annotate(&rendered, &modifiers)
        }
    }

    fn render_name(&mut self, name: &QualifiedName) -> String {
        let full_name = name.full_name();

        if self.declared.contains(full_name.as_str()) {
            return self.mapping.declared(&full_name);
        }

        if let Some(rendered) = self.mapping.table().primitive(&full_name) {
            return rendered.to_string();
        }

        let kind = if self.spec.is_primitive(&full_name) {
            IssueKind::UnmappablePrimitive
        } else {
            IssueKind::UnresolvedIdentifier
        };
        self.record(kind, &full_name, None);
        self.mapping.placeholder(&full_name)
    }

    fn resolve_template(&mut self, instance: &TemplateInstance) -> String {
        let full_name = instance.full_name();

        let Some(mapping) = self.mapping.table().template(&full_name) else {
            self.record(IssueKind::UnmappableTemplate, &full_name, None);
            return self.mapping.placeholder(&template_detail(&full_name, instance));
        };

        let arguments: Vec<String> = instance
            .template_arguments
            .iter()
            .map(|arg| self.resolve(arg))
            .collect();

        if arguments.len() != mapping.arity {
            let detail = format!(
                "expected {} argument(s), found {}",
                mapping.arity,
                arguments.len()
            );
            self.record(IssueKind::UnmappableTemplate, &full_name, Some(detail));
            return self.mapping.placeholder(&template_detail(&full_name, instance));
        }

        (mapping.render)(&arguments)
    }

    fn resolve_function(&mut self, function: &FunctionType) -> String {
        let arguments = self.resolve_arguments(&function.arguments);
        let ret = self.resolve(&function.ret);
        let rendered = self.mapping.function(&arguments, &ret);

        let modifiers = TypeSpec::Function(function.clone()).modifier_names();
        if modifiers.is_empty() {
            rendered
        } else {
            self.mapping.annotate(&rendered, &modifiers)
        }
    }

    fn record(&mut self, kind: IssueKind, identifier: &str, detail: Option<String>) {
        tracing::debug!("placeholder for {} `{}` in {}", kind, identifier, self.location);
        self.issues.push(ResolutionIssue {
            kind,
            identifier: identifier.to_string(),
            location: self.location.clone(),
            detail,
        });
    }
}

/// `name<[json arguments]>`, the diagnosable body of a template placeholder.
fn template_detail(full_name: &str, instance: &TemplateInstance) -> String {
    let arguments = serde_json::to_string(&instance.template_arguments)
        .unwrap_or_else(|_| "[]".to_string());
    format!("{}<{}>", full_name, arguments)
}
