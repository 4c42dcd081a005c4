//! Spec fixtures for unit tests.
//!
//! Every fixture is structurally valid under every naming convention.

use crate::spec::{
    ArgumentSpec, ClassSpec, EnumSpec, FieldSpec, FunctionType, InterfaceSpec, RecordSpec, Spec,
    TypeSpec,
};

/// Plain enum `Color = {Red, Green, Blue}`.
pub fn color_enum_spec() -> Spec {
    let mut spec = Spec::default();
    spec.enums
        .insert("Color".to_string(), EnumSpec::plain(["Red", "Green", "Blue"]));
    spec
}

/// Flag enum `Access = {Read: 1, Write: 2, Exec: 4}`.
pub fn access_flags_spec() -> Spec {
    let mut spec = Spec::default();
    spec.enums.insert(
        "Access".to_string(),
        EnumSpec::flags([("Read", 1), ("Write", 2), ("Exec", 4)]),
    );
    spec
}

/// Record `Person { name: std::string, age: int64_t = 0 }`.
pub fn person_record_spec() -> Spec {
    let mut spec = Spec::default();
    spec.records.insert(
        "Person".to_string(),
        RecordSpec::default()
            .with_field("name", FieldSpec::required(TypeSpec::named("std::string")))
            .with_field("age", FieldSpec::with_default(TypeSpec::named("int64_t"), "0")),
    );
    spec
}

/// Class `Session` with an overloaded `open`, wrapped as `SharedSession`.
pub fn session_spec() -> Spec {
    let path = || ArgumentSpec::new("path", TypeSpec::named("std::string"));

    let mut spec = Spec::default();
    spec.classes.insert(
        "Session".to_string(),
        ClassSpec::default()
            .with_static_method("create", FunctionType::new(vec![], TypeSpec::named("SharedSession")))
            .with_property("is_closed", TypeSpec::named("bool"))
            .with_method("open", FunctionType::new(vec![path()], TypeSpec::named("void")))
            .with_method(
                "open",
                FunctionType::new(
                    vec![path(), ArgumentSpec::new("read_only", TypeSpec::named("bool"))],
                    TypeSpec::named("void"),
                ),
            )
            .with_shared_ptr("SharedSession"),
    );
    spec
}

/// Type alias `Lookup = my::CustomMap<K, V>` over an unregistered template.
pub fn custom_map_spec() -> Spec {
    let mut spec = Spec::default();
    spec.templates.push("my::CustomMap".to_string());
    spec.type_aliases.insert(
        "Lookup".to_string(),
        TypeSpec::template(
            "my::CustomMap",
            vec![TypeSpec::named("K"), TypeSpec::named("V")],
        ),
    );
    spec
}

/// A spec using every entity kind.
pub fn sample_spec() -> Spec {
    let mut spec = session_spec();
    spec.primitives = ["void", "bool", "int", "int64_t", "std::string"]
        .iter()
        .map(|p| p.to_string())
        .collect();
    spec.templates = ["std::vector", "util::Optional", "std::shared_ptr"]
        .iter()
        .map(|t| t.to_string())
        .collect();

    spec.enums.extend(color_enum_spec().enums);
    spec.enums.extend(access_flags_spec().enums);
    spec.records.extend(person_record_spec().records);
    spec.opaque_types.push("Handle".to_string());

    spec.type_aliases.insert(
        "Names".to_string(),
        TypeSpec::template("std::vector", vec![TypeSpec::named("std::string")]),
    );
    spec.type_aliases.insert(
        "Callback".to_string(),
        FunctionType::new(
            vec![ArgumentSpec::new("count", TypeSpec::named("int"))],
            TypeSpec::named("void"),
        )
        .into(),
    );

    spec.records.insert(
        "Options".to_string(),
        RecordSpec::default()
            .with_field("handle", FieldSpec::required(TypeSpec::named("Handle")))
            .with_field(
                "tags",
                FieldSpec::with_default(
                    TypeSpec::template("util::Optional", vec![TypeSpec::named("Names")]),
                    "{}",
                ),
            ),
    );

    spec.interfaces.insert(
        "Listener".to_string(),
        InterfaceSpec::default().with_method(
            "on_change",
            FunctionType::new(
                vec![ArgumentSpec::new("session", TypeSpec::template(
                    "std::shared_ptr",
                    vec![TypeSpec::named("Session")],
                ))],
                TypeSpec::named("void"),
            ),
        ),
    );

    spec
}
