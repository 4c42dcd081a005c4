//! The spec model: every entity a native API surface can declare.
//!
//! A [`Spec`] is built once by the loading stage and is read-only for the
//! rest of a generation run. All entity maps are [`IndexMap`]s because
//! insertion order is emission order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{FunctionType, TypeSpec};

/// Root of a language-neutral API description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spec {
    /// Primitive names the native side uses (`bool`, `int64_t`, ...).
    pub primitives: Vec<String>,

    /// Template names the native side instantiates (`std::vector`, ...).
    pub templates: Vec<String>,

    pub records: IndexMap<String, RecordSpec>,

    pub classes: IndexMap<String, ClassSpec>,

    pub interfaces: IndexMap<String, InterfaceSpec>,

    pub enums: IndexMap<String, EnumSpec>,

    pub type_aliases: IndexMap<String, TypeSpec>,

    pub opaque_types: Vec<String>,
}

/// Kind of a top-level declaration, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Record,
    Class,
    SharedPtrWrapper,
    Interface,
    TypeAlias,
    Enum,
    OpaqueType,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Record => write!(f, "record"),
            EntityKind::Class => write!(f, "class"),
            EntityKind::SharedPtrWrapper => write!(f, "shared-ownership wrapper"),
            EntityKind::Interface => write!(f, "interface"),
            EntityKind::TypeAlias => write!(f, "type alias"),
            EntityKind::Enum => write!(f, "enum"),
            EntityKind::OpaqueType => write!(f, "opaque type"),
        }
    }
}

impl Spec {
    /// Every identifier declared by an entity, with the kind declaring it.
    ///
    /// Shared-ownership wrapper names count as declarations: references to
    /// them resolve like references to the class itself.
    pub fn declared_identifiers(&self) -> Vec<(&str, EntityKind)> {
        let mut declared = Vec::new();
        declared.extend(self.records.keys().map(|n| (n.as_str(), EntityKind::Record)));
        declared.extend(self.classes.keys().map(|n| (n.as_str(), EntityKind::Class)));
        declared.extend(
            self.classes
                .values()
                .filter_map(|c| c.shared_ptr_wrapped.as_deref())
                .map(|n| (n, EntityKind::SharedPtrWrapper)),
        );
        declared.extend(self.interfaces.keys().map(|n| (n.as_str(), EntityKind::Interface)));
        declared.extend(self.type_aliases.keys().map(|n| (n.as_str(), EntityKind::TypeAlias)));
        declared.extend(self.enums.keys().map(|n| (n.as_str(), EntityKind::Enum)));
        declared.extend(self.opaque_types.iter().map(|n| (n.as_str(), EntityKind::OpaqueType)));
        declared
    }

    /// Whether `name` is declared by any entity.
    pub fn declares(&self, name: &str) -> bool {
        self.declared_identifiers().iter().any(|(n, _)| *n == name)
    }

    /// Whether `name` is one of the declared primitives.
    pub fn is_primitive(&self, name: &str) -> bool {
        self.primitives.iter().any(|p| p == name)
    }

    /// Whether `name` is an opaque type.
    pub fn is_opaque(&self, name: &str) -> bool {
        self.opaque_types.iter().any(|o| o == name)
    }

    /// Total number of top-level entities.
    pub fn entity_count(&self) -> usize {
        self.records.len()
            + self.classes.len()
            + self.interfaces.len()
            + self.enums.len()
            + self.type_aliases.len()
            + self.opaque_types.len()
    }
}

/// A plain aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSpec {
    pub fields: IndexMap<String, FieldSpec>,
}

impl RecordSpec {
    pub fn with_field(mut self, name: impl Into<String>, field: FieldSpec) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

/// One record field. A field with a default is optional in permissive targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub ty: TypeSpec,

    /// Native default expression, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn required(ty: TypeSpec) -> Self {
        FieldSpec { ty, default: None }
    }

    pub fn with_default(ty: TypeSpec, default: impl Into<String>) -> Self {
        FieldSpec {
            ty,
            default: Some(default.into()),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// One overload of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub sig: FunctionType,
}

impl From<FunctionType> for MethodSpec {
    fn from(sig: FunctionType) -> Self {
        MethodSpec { sig }
    }
}

/// Method name → ordered overloads.
pub type MethodTable = IndexMap<String, Vec<MethodSpec>>;

/// A class with storage and behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassSpec {
    pub methods: MethodTable,

    pub static_methods: MethodTable,

    pub properties: IndexMap<String, TypeSpec>,

    /// Name of the shared-ownership alias for this class, if any.
    pub shared_ptr_wrapped: Option<String>,
}

impl ClassSpec {
    pub fn with_method(mut self, name: impl Into<String>, sig: FunctionType) -> Self {
        self.methods.entry(name.into()).or_default().push(sig.into());
        self
    }

    pub fn with_static_method(mut self, name: impl Into<String>, sig: FunctionType) -> Self {
        self.static_methods
            .entry(name.into())
            .or_default()
            .push(sig.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: TypeSpec) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    pub fn with_shared_ptr(mut self, name: impl Into<String>) -> Self {
        self.shared_ptr_wrapped = Some(name.into());
        self
    }
}

/// A capability contract: signatures only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSpec {
    pub methods: MethodTable,
}

impl InterfaceSpec {
    pub fn with_method(mut self, name: impl Into<String>, sig: FunctionType) -> Self {
        self.methods.entry(name.into()).or_default().push(sig.into());
        self
    }
}

/// An enumeration, plain or flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumSpec {
    #[serde(default)]
    pub is_flag: bool,

    pub values: EnumValues,
}

/// Members of an enum as written in the spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValues {
    /// Member names only; each member's value is its own name.
    Names(Vec<String>),

    /// Member name → caller-assigned integer. `None` is a missing value.
    Valued(IndexMap<String, Option<serde_json::Number>>),
}

impl EnumSpec {
    /// A plain enum whose values are the member names.
    pub fn plain<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumSpec {
            is_flag: false,
            values: EnumValues::Names(members.into_iter().map(Into::into).collect()),
        }
    }

    /// A flag enum with explicit bit-pattern values.
    pub fn flags<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        EnumSpec {
            is_flag: true,
            values: EnumValues::Valued(
                members
                    .into_iter()
                    .map(|(name, value)| (name.into(), Some(serde_json::Number::from(value))))
                    .collect(),
            ),
        }
    }

    /// Member names in declaration order.
    pub fn member_names(&self) -> Vec<&str> {
        match &self.values {
            EnumValues::Names(names) => names.iter().map(String::as_str).collect(),
            EnumValues::Valued(values) => values.keys().map(String::as_str).collect(),
        }
    }
}

/// Integer rendering of a flag value, exactly as written.
///
/// Returns `None` for non-integers. The digits come straight from the parsed
/// number, so no bits are lost to a float round-trip.
pub fn flag_value_literal(value: &serde_json::Number) -> Option<String> {
    if let Some(v) = value.as_u64() {
        Some(v.to_string())
    } else {
        value.as_i64().map(|v| v.to_string())
    }
}
