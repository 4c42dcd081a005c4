//! The spec model: a language-neutral description of a native API surface.

pub mod load;
pub mod model;
pub mod types;
pub mod validation;

pub use load::{load_spec, parse_spec, SpecFormat};
pub use model::{
    ClassSpec, EntityKind, EnumSpec, EnumValues, FieldSpec, InterfaceSpec, MethodSpec,
    MethodTable, RecordSpec, Spec,
};
pub use types::{ArgumentSpec, FunctionType, QualifiedName, TemplateInstance, TypeSpec};
pub use validation::{validate, SpecViolation};
