//! Structural validation of a spec against one target's naming convention.
//!
//! Violations are fatal for the target being generated: emitting code for an
//! inconsistent spec would mean fabricating values (a flag without a number)
//! or silently shadowing a member (two names collapsing into one).

use std::collections::HashMap;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::bindgen::naming::IdentifierRules;
use crate::bindgen::resolver::entity_identifier;
use crate::spec::model::{flag_value_literal, EntityKind, EnumValues, MethodTable, Spec};
use crate::spec::types::TypeSpec;
use crate::util::diagnostic::Diagnostic;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum SpecViolation {
    #[error("flag enum `{enum_name}` member `{member}` has no integer value")]
    #[diagnostic(
        code(bindspec::spec::flag_without_value),
        help("Give every member of a flag enum an explicit integer value")
    )]
    FlagMemberWithoutValue { enum_name: String, member: String },

    #[error("flag enum `{enum_name}` member `{member}` has non-integer value `{value}`")]
    #[diagnostic(code(bindspec::spec::flag_not_integer))]
    FlagValueNotInteger {
        enum_name: String,
        member: String,
        value: String,
    },

    #[error("plain enum `{enum_name}` declares explicit values")]
    #[diagnostic(
        code(bindspec::spec::plain_enum_values),
        help("Mark the enum with `isFlag: true` or list member names only")
    )]
    PlainEnumWithValues { enum_name: String },

    #[error("field `{record}.{field}` declares a default but {reason}")]
    #[diagnostic(code(bindspec::spec::default_not_allowed))]
    DefaultNotAllowed {
        record: String,
        field: String,
        reason: String,
    },

    #[error("empty type name in {location}")]
    #[diagnostic(code(bindspec::spec::empty_type_name))]
    EmptyTypeName { location: String },

    #[error("`{name}` is declared as both {first} and {second}")]
    #[diagnostic(code(bindspec::spec::duplicate_declaration))]
    DuplicateDeclaration {
        name: String,
        first: EntityKind,
        second: EntityKind,
    },

    #[error("`{first}` and `{second}` in {scope} both become `{rendered}`")]
    #[diagnostic(
        code(bindspec::spec::name_collision),
        help("Rename one of the members so they stay distinct after case conversion")
    )]
    NameCollision {
        scope: String,
        first: String,
        second: String,
        rendered: String,
    },
}

impl SpecViolation {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self.help() {
            Some(help) => diag.with_suggestion(help.to_string()),
            None => diag,
        }
    }
}

/// Check every structural invariant, returning all violations found.
///
/// Name collisions are judged by the identifiers `rules` produces, so the
/// result depends on the target.
pub fn validate(spec: &Spec, rules: impl Into<IdentifierRules>) -> Vec<SpecViolation> {
    let naming = rules.into();
    let mut violations = Vec::new();

    check_declarations(spec, &mut violations);
    check_enums(spec, naming, &mut violations);
    check_records(spec, naming, &mut violations);
    check_classes(spec, naming, &mut violations);
    check_interfaces(spec, naming, &mut violations);

    for (name, ty) in &spec.type_aliases {
        check_type(ty, &format!("type alias {}", name), &mut violations);
    }

    violations
}

fn check_declarations(spec: &Spec, violations: &mut Vec<SpecViolation>) {
    let mut seen: HashMap<&str, EntityKind> = HashMap::new();
    let mut unique = Vec::new();
    for (name, kind) in spec.declared_identifiers() {
        if let Some(first) = seen.get(name) {
            violations.push(SpecViolation::DuplicateDeclaration {
                name: name.to_string(),
                first: *first,
                second: kind,
            });
        } else {
            seen.insert(name, kind);
            unique.push(name);
        }
    }

    check_collisions("top-level declarations", unique, entity_identifier, violations);
}

fn check_enums(spec: &Spec, naming: IdentifierRules, violations: &mut Vec<SpecViolation>) {
    for (enum_name, e) in &spec.enums {
        check_collisions(
            &format!("enum {}", enum_name),
            e.member_names(),
            |n| naming.enum_member(n),
            violations,
        );

        match (&e.values, e.is_flag) {
            (EnumValues::Names(names), true) => {
                for member in names {
                    violations.push(SpecViolation::FlagMemberWithoutValue {
                        enum_name: enum_name.clone(),
                        member: member.clone(),
                    });
                }
            }
            (EnumValues::Valued(values), true) => {
                for (member, value) in values {
                    match value {
                        None => violations.push(SpecViolation::FlagMemberWithoutValue {
                            enum_name: enum_name.clone(),
                            member: member.clone(),
                        }),
                        Some(number) if flag_value_literal(number).is_none() => {
                            violations.push(SpecViolation::FlagValueNotInteger {
                                enum_name: enum_name.clone(),
                                member: member.clone(),
                                value: number.to_string(),
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
            (EnumValues::Valued(_), false) => {
                violations.push(SpecViolation::PlainEnumWithValues {
                    enum_name: enum_name.clone(),
                });
            }
            (EnumValues::Names(_), false) => {}
        }
    }
}

fn check_records(spec: &Spec, naming: IdentifierRules, violations: &mut Vec<SpecViolation>) {
    for (record, r) in &spec.records {
        for (field, f) in &r.fields {
            check_type(&f.ty, &format!("record {}.{}", record, field), violations);

            if f.default.is_none() {
                continue;
            }
            let reason = match &f.ty {
                TypeSpec::Function(_) => Some("its type is a function".to_string()),
                TypeSpec::QualifiedName(q) if spec.is_opaque(&q.full_name()) => Some(format!(
                    "`{}` is an opaque type and cannot be constructed",
                    q.full_name()
                )),
                _ => None,
            };
            if let Some(reason) = reason {
                violations.push(SpecViolation::DefaultNotAllowed {
                    record: record.clone(),
                    field: field.clone(),
                    reason,
                });
            }
        }

        check_collisions(
            &format!("record {}", record),
            r.fields.keys().map(String::as_str).collect(),
            |n| naming.member(n),
            violations,
        );
    }
}

fn check_classes(spec: &Spec, naming: IdentifierRules, violations: &mut Vec<SpecViolation>) {
    for (class, c) in &spec.classes {
        for (property, ty) in &c.properties {
            check_type(ty, &format!("class {}.{}", class, property), violations);
        }
        check_methods(&format!("class {}", class), &c.methods, naming, violations);
        check_methods(&format!("class {} (static)", class), &c.static_methods, naming, violations);

        // Properties and instance methods share one namespace on the instance.
        let instance_members = c
            .properties
            .keys()
            .chain(c.methods.keys())
            .map(String::as_str)
            .collect();
        check_collisions(
            &format!("class {}", class),
            instance_members,
            |n| naming.member(n),
            violations,
        );
        check_collisions(
            &format!("class {} (static)", class),
            c.static_methods.keys().map(String::as_str).collect(),
            |n| naming.member(n),
            violations,
        );
    }
}

fn check_interfaces(spec: &Spec, naming: IdentifierRules, violations: &mut Vec<SpecViolation>) {
    for (interface, i) in &spec.interfaces {
        let scope = format!("interface {}", interface);
        check_methods(&scope, &i.methods, naming, violations);
        check_collisions(
            &scope,
            i.methods.keys().map(String::as_str).collect(),
            |n| naming.member(n),
            violations,
        );
    }
}

fn check_methods(
    scope: &str,
    methods: &MethodTable,
    naming: IdentifierRules,
    violations: &mut Vec<SpecViolation>,
) {
    for (name, overloads) in methods {
        for method in overloads {
            let location = format!("{}.{}", scope, name);
            for arg in &method.sig.arguments {
                check_type(&arg.ty, &location, violations);
            }
            check_type(&method.sig.ret, &location, violations);
            check_collisions(
                &format!("arguments of {}", location),
                method.sig.arguments.iter().map(|a| a.name.as_str()).collect(),
                |n| naming.member(n),
                violations,
            );
        }
    }
}

fn check_type(ty: &TypeSpec, location: &str, violations: &mut Vec<SpecViolation>) {
    match ty {
        TypeSpec::QualifiedName(q) => {
            if q.names.iter().all(|n| n.is_empty()) {
                violations.push(SpecViolation::EmptyTypeName {
                    location: location.to_string(),
                });
            }
        }
        TypeSpec::TemplateInstance(t) => {
            if t.names.iter().all(|n| n.is_empty()) {
                violations.push(SpecViolation::EmptyTypeName {
                    location: location.to_string(),
                });
            }
            for arg in &t.template_arguments {
                check_type(arg, location, violations);
            }
        }
        TypeSpec::Function(f) => {
            for arg in &f.arguments {
                check_type(&arg.ty, location, violations);
            }
            check_type(&f.ret, location, violations);
        }
    }
}

/// Report every pair of distinct names that render to the same identifier.
fn check_collisions<F>(scope: &str, names: Vec<&str>, render: F, violations: &mut Vec<SpecViolation>)
where
    F: Fn(&str) -> String,
{
    let mut rendered: HashMap<String, &str> = HashMap::new();
    for name in names {
        let target_name = render(name);
        match rendered.get(&target_name) {
            Some(first) if *first != name => {
                violations.push(SpecViolation::NameCollision {
                    scope: scope.to_string(),
                    first: first.to_string(),
                    second: name.to_string(),
                    rendered: target_name,
                });
            }
            Some(_) => {}
            None => {
                rendered.insert(target_name, name);
            }
        }
    }
}
