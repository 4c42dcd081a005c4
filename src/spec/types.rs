//! Type expressions.
//!
//! A type expression describes one occurrence of a type: a field, an
//! argument, a return value, or the target of an alias. The set of kinds is
//! closed; every consumer matches on [`TypeSpec`] exhaustively.

use serde::{Deserialize, Serialize};

/// Scope separator used when joining a qualified path.
pub const SCOPE_SEPARATOR: &str = "::";

/// A type occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeSpec {
    /// A (possibly scoped) name, e.g. `std::string` or `Session`.
    QualifiedName(QualifiedName),

    /// A template applied to type arguments, e.g. `std::vector<int>`.
    TemplateInstance(TemplateInstance),

    /// A function used as a value (callbacks, listeners).
    Function(FunctionType),
}

impl TypeSpec {
    /// Shorthand for an unmodified qualified name, split on `::`.
    pub fn named(name: &str) -> Self {
        TypeSpec::QualifiedName(QualifiedName::new(name))
    }

    /// Shorthand for a template instance with the given arguments.
    pub fn template(name: &str, arguments: Vec<TypeSpec>) -> Self {
        TypeSpec::TemplateInstance(TemplateInstance::new(name, arguments))
    }

    /// Whether the const modifier is set.
    pub fn is_const(&self) -> bool {
        match self {
            TypeSpec::QualifiedName(q) => q.is_const,
            TypeSpec::TemplateInstance(t) => t.is_const,
            TypeSpec::Function(f) => f.is_const,
        }
    }

    /// Return a copy with the const modifier set to `value`.
    pub fn with_const(&self, value: bool) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            TypeSpec::QualifiedName(q) => q.is_const = value,
            TypeSpec::TemplateInstance(t) => t.is_const = value,
            TypeSpec::Function(f) => f.is_const = value,
        }
        copy
    }

    /// Names of modifiers carried by this expression, in a stable order.
    ///
    /// Used for the trailing modifier comment most targets cannot express
    /// structurally.
    pub fn modifier_names(&self) -> Vec<&'static str> {
        let mut modifiers = Vec::new();
        if self.is_const() {
            modifiers.push("const");
        }
        match self {
            TypeSpec::QualifiedName(q) => {
                if q.is_pointer {
                    modifiers.push("pointer");
                }
                if q.is_reference {
                    modifiers.push("reference");
                }
                if q.is_rvalue_reference {
                    modifiers.push("rvalue-reference");
                }
            }
            TypeSpec::TemplateInstance(_) => {}
            TypeSpec::Function(f) => {
                if f.is_no_except {
                    modifiers.push("noexcept");
                }
            }
        }
        modifiers
    }
}

/// A scoped identifier plus its modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedName {
    /// Scope path, outermost first.
    pub names: Vec<String>,

    #[serde(default)]
    pub is_const: bool,

    #[serde(default)]
    pub is_pointer: bool,

    #[serde(default)]
    pub is_reference: bool,

    #[serde(default)]
    pub is_rvalue_reference: bool,
}

impl QualifiedName {
    /// Create an unmodified name from a `::`-separated string.
    pub fn new(full_name: &str) -> Self {
        QualifiedName {
            names: split_path(full_name),
            ..Default::default()
        }
    }

    /// The fully-qualified name, joined with `::`.
    pub fn full_name(&self) -> String {
        self.names.join(SCOPE_SEPARATOR)
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    pub fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn rvalue_reference(mut self) -> Self {
        self.is_rvalue_reference = true;
        self
    }
}

impl From<QualifiedName> for TypeSpec {
    fn from(value: QualifiedName) -> Self {
        TypeSpec::QualifiedName(value)
    }
}

/// A template applied to an ordered list of type arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInstance {
    /// Template path, outermost first.
    pub names: Vec<String>,

    #[serde(default)]
    pub template_arguments: Vec<TypeSpec>,

    #[serde(default)]
    pub is_const: bool,
}

impl TemplateInstance {
    /// Create an instance of the `::`-separated template name.
    pub fn new(full_name: &str, template_arguments: Vec<TypeSpec>) -> Self {
        TemplateInstance {
            names: split_path(full_name),
            template_arguments,
            is_const: false,
        }
    }

    /// The fully-qualified template name, joined with `::`.
    pub fn full_name(&self) -> String {
        self.names.join(SCOPE_SEPARATOR)
    }
}

impl From<TemplateInstance> for TypeSpec {
    fn from(value: TemplateInstance) -> Self {
        TypeSpec::TemplateInstance(value)
    }
}

/// A named argument of a function or method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeSpec,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, ty: TypeSpec) -> Self {
        ArgumentSpec {
            name: name.into(),
            ty,
        }
    }
}

/// A function type: arguments, return type, and modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionType {
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,

    #[serde(rename = "return")]
    pub ret: Box<TypeSpec>,

    #[serde(default)]
    pub is_const: bool,

    #[serde(default)]
    pub is_no_except: bool,
}

impl FunctionType {
    /// Create a function type with no modifiers.
    pub fn new(arguments: Vec<ArgumentSpec>, ret: TypeSpec) -> Self {
        FunctionType {
            arguments,
            ret: Box::new(ret),
            is_const: false,
            is_no_except: false,
        }
    }

    pub fn no_except(mut self) -> Self {
        self.is_no_except = true;
        self
    }
}

impl From<FunctionType> for TypeSpec {
    fn from(value: FunctionType) -> Self {
        TypeSpec::Function(value)
    }
}

fn split_path(full_name: &str) -> Vec<String> {
    if full_name.is_empty() {
        return Vec::new();
    }
    full_name
        .split(SCOPE_SEPARATOR)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_full_name() {
        let name = QualifiedName::new("realm::util::Optional");
        assert_eq!(name.names, vec!["realm", "util", "Optional"]);
        assert_eq!(name.full_name(), "realm::util::Optional");
    }

    #[test]
    fn test_with_const_toggles_every_kind() {
        let named = TypeSpec::named("int");
        assert!(named.with_const(true).is_const());

        let template = TypeSpec::template("std::vector", vec![TypeSpec::named("int")]);
        assert!(template.with_const(true).is_const());

        let func: TypeSpec = FunctionType::new(vec![], TypeSpec::named("void")).into();
        assert!(func.with_const(true).is_const());
        assert!(!func.with_const(true).with_const(false).is_const());
    }

    #[test]
    fn test_modifier_names() {
        let ty: TypeSpec = QualifiedName::new("Foo").constant().pointer().into();
        assert_eq!(ty.modifier_names(), vec!["const", "pointer"]);

        let func: TypeSpec = FunctionType::new(vec![], TypeSpec::named("void"))
            .no_except()
            .into();
        assert_eq!(func.modifier_names(), vec!["noexcept"]);
    }

    #[test]
    fn test_deserialize_tagged_kinds() {
        let json = r#"{
            "kind": "template-instance",
            "names": ["std", "vector"],
            "templateArguments": [
                { "kind": "qualified-name", "names": ["std", "string"], "isConst": true },
                {
                    "kind": "function",
                    "arguments": [{ "name": "x", "type": { "kind": "qualified-name", "names": ["int"] } }],
                    "return": { "kind": "qualified-name", "names": ["void"] },
                    "isNoExcept": true
                }
            ]
        }"#;

        let ty: TypeSpec = serde_json::from_str(json).unwrap();
        let TypeSpec::TemplateInstance(inst) = ty else {
            panic!("expected template instance");
        };
        assert_eq!(inst.full_name(), "std::vector");
        assert!(inst.template_arguments[0].is_const());
        assert!(matches!(
            &inst.template_arguments[1],
            TypeSpec::Function(f) if f.is_no_except && f.arguments.len() == 1
        ));
    }
}
