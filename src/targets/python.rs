//! Python backend: typed stubs plus a runtime bridge.
//!
//! `native.pyi` carries every declaration; `native.py` binds each class from
//! the compiled extension module at import time.

use crate::bindgen::{
    entity_identifier, GenerateError, IdentifierRules, MappingTable, NamingConvention,
    TemplateMapping, TypeMapping,
};
use crate::output::OutputUnit;
use crate::spec::{MethodSpec, MethodTable, Spec};
use crate::targets::{
    enum_members, member_location, Emission, EnumMember, Target, TargetId, GENERATED_BANNER,
};

const STEPS: &[&str] = &["black", "mypy"];

const INDENT: &str = "    ";

static PYTHON_TABLE: MappingTable = MappingTable {
    primitives: &[
        ("void", "None"),
        ("bool", "bool"),
        ("int", "int"),
        ("int64_t", "int"),
        ("int32_t", "int"),
        ("uint64_t", "int"),
        ("std::string", "str"),
        ("StringData", "str | None"),
        ("BinaryData", "bytes | None"),
        ("OwnedBinaryData", "bytes | None"),
    ],
    templates: &[
        (
            "std::vector",
            TemplateMapping {
                arity: 1,
                render: |args| format!("list[{}]", args[0]),
            },
        ),
        (
            "util::Optional",
            TemplateMapping {
                arity: 1,
                render: |args| format!("{} | None", args[0]),
            },
        ),
        (
            "std::shared_ptr",
            TemplateMapping {
                arity: 1,
                render: |args| args[0].clone(),
            },
        ),
    ],
};

/// Python type-hint syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonMapping;

impl TypeMapping for PythonMapping {
    fn table(&self) -> &'static MappingTable {
        &PYTHON_TABLE
    }

    fn naming(&self) -> NamingConvention {
        NamingConvention::SnakeCase
    }

    fn readonly(&self, inner: &str) -> String {
        format!("Annotated[{}, \"const\"]", inner)
    }

    // Callable drops argument names.
    fn function(&self, arguments: &[(String, String)], ret: &str) -> String {
        let types: Vec<&str> = arguments.iter().map(|(_, ty)| ty.as_str()).collect();
        format!("Callable[[{}], {}]", types.join(", "), ret)
    }

    fn annotate(&self, rendered: &str, modifiers: &[&str]) -> String {
        format!("Annotated[{}, {}]", rendered, string_literal(&modifiers.join(" ")))
    }

    fn placeholder(&self, detail: &str) -> String {
        format!("Annotated[Any, {}]", string_literal(&format!("unknown: {}", detail)))
    }
}

/// Python string literal, quoted the way `repr` would.
fn string_literal(text: &str) -> String {
    if text.contains('"') && !text.contains('\'') {
        return format!("'{}'", text.replace('\\', "\\\\"));
    }
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// A usable Python identifier: keywords gain a trailing underscore.
pub fn python_identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// The Python stubs target.
#[derive(Debug, Clone, Default)]
pub struct PythonTarget {
    mapping: PythonMapping,
}

impl PythonTarget {
    pub fn new() -> Self {
        Self::default()
    }

    fn member_name(&self, name: &str) -> String {
        self.identifiers().member(name)
    }

    fn emit_enums(&self, spec: &Spec, out: &mut OutputUnit) -> Result<(), GenerateError> {
        for (name, e) in &spec.enums {
            tracing::debug!("emitting enum {}", name);
            let members = enum_members(self.id(), name, e)?;
            let base = if e.is_flag { "IntFlag" } else { "Enum" };

            out.line(format!("class {}({}):", entity_identifier(name), base));
            if members.is_empty() {
                out.line(format!("{}pass", INDENT));
            }
            for member in members {
                match member {
                    EnumMember::Named(member) => out.line(format!(
                        "{}{} = {}",
                        INDENT,
                        self.identifiers().enum_member(member),
                        string_literal(member)
                    )),
                    EnumMember::Flag(member, value) => out.line(format!(
                        "{}{} = {}",
                        INDENT,
                        self.identifiers().enum_member(member),
                        value
                    )),
                }
            }
            out.line("");
        }
        Ok(())
    }

    fn emit_signature(
        &self,
        emission: &mut Emission<'_>,
        out: &mut OutputUnit,
        name: &str,
        method: &MethodSpec,
        receiver: Option<&str>,
    ) {
        let mut parameters: Vec<String> = receiver.into_iter().map(str::to_string).collect();
        for (arg, ty) in emission.resolver.resolve_arguments(&method.sig.arguments) {
            parameters.push(format!("{}: {}", python_identifier(&arg), ty));
        }
        let ret = emission.resolver.resolve(&method.sig.ret);

        out.line(format!(
            "{}def {}({}) -> {}: ...",
            INDENT,
            self.member_name(name),
            parameters.join(", "),
            ret
        ));
    }

    /// Emit a method table. Returns the number of lines written.
    fn emit_methods(
        &self,
        emission: &mut Emission<'_>,
        out: &mut OutputUnit,
        kind: &str,
        owner: &str,
        methods: &MethodTable,
        is_static: bool,
    ) -> usize {
        let mut written = 0;
        for (name, overloads) in methods {
            emission.resolver.at(member_location(kind, owner, name));
            for method in overloads {
                if overloads.len() > 1 {
                    out.line(format!("{}@overload", INDENT));
                }
                if is_static {
                    out.line(format!("{}@staticmethod", INDENT));
                    self.emit_signature(emission, out, name, method, None);
                } else {
                    self.emit_signature(emission, out, name, method, Some("self"));
                }
                written += 1;
            }
        }
        written
    }
}

impl Target for PythonTarget {
    fn id(&self) -> TargetId {
        TargetId::Python
    }

    fn mapping(&self) -> &dyn TypeMapping {
        &self.mapping
    }

    fn description(&self) -> &'static str {
        "Python type stubs with an extension-module bridge"
    }

    fn default_bridge_module(&self) -> &'static str {
        "_native"
    }

    fn identifiers(&self) -> IdentifierRules {
        IdentifierRules::new(self.naming()).with_escape(python_identifier)
    }

    fn emit(&self, spec: &Spec, emission: &mut Emission<'_>) -> Result<(), GenerateError> {
        let mut out = emission.open("native.pyi", STEPS);
        out.line(format!("# {}", GENERATED_BANNER));
        out.line("from enum import Enum, IntFlag");
        out.line(
            "from typing import Annotated, Any, Callable, NoReturn, NotRequired, Protocol, \
             TypeAlias, TypedDict, final, overload",
        );
        out.line("");

        out.line("# Enums");
        self.emit_enums(spec, &mut out)?;

        out.line("# Opaque types");
        for name in &spec.opaque_types {
            out.lines([
                "@final".to_string(),
                format!("class {}:", entity_identifier(name)),
                format!("{}\"\"\"Nominal marker type with no visible structure.\"\"\"", INDENT),
                format!("{}def __init__(self) -> NoReturn: ...", INDENT),
                String::new(),
            ]);
        }

        out.line("# Type aliases");
        for (name, ty) in &spec.type_aliases {
            emission.resolver.at(format!("type alias {}", name));
            let rendered = emission.resolver.resolve(ty);
            out.line(format!("{}: TypeAlias = {}", entity_identifier(name), rendered));
        }
        out.line("");

        out.line("# Records");
        for (name, record) in &spec.records {
            tracing::debug!("emitting record {}", name);
            out.line(format!("class {}(TypedDict):", entity_identifier(name)));
            if record.fields.is_empty() {
                out.line(format!("{}pass", INDENT));
            }
            for (field_name, field) in &record.fields {
                emission.resolver.at(format!("record {}.{}", name, field_name));
                let rendered = emission.resolver.resolve(&field.ty);
                let rendered = if field.is_optional() {
                    format!("NotRequired[{}]", rendered)
                } else {
                    rendered
                };
                out.line(format!("{}{}: {}", INDENT, self.member_name(field_name), rendered));
            }
            out.line("");
        }

        let mut py = emission.open("native.py", STEPS);
        py.line(format!("# {}", GENERATED_BANNER));
        py.line("from importlib import import_module");
        py.line("");
        py.line(format!("_bridge = import_module({})", string_literal(emission.bridge_module())));
        py.line("");

        out.line("# Classes");
        let mut exported = Vec::new();
        for (name, class) in &spec.classes {
            tracing::debug!("emitting class {}", name);
            let ident = entity_identifier(name);
            py.line(format!("{} = _bridge.{}", ident, ident));

            out.line(format!("class {}:", ident));
            let mut members =
                self.emit_methods(emission, &mut out, "class", name, &class.static_methods, true);
            for (property, ty) in &class.properties {
                emission.resolver.at(format!("class {}.{}", name, property));
                let rendered = emission.resolver.resolve(ty);
                out.line(format!("{}{}: {}", INDENT, self.member_name(property), rendered));
                members += 1;
            }
            members += self.emit_methods(emission, &mut out, "class", name, &class.methods, false);
            if members == 0 {
                out.line(format!("{}pass", INDENT));
            }
            out.line("");

            if let Some(ref wrapper) = class.shared_ptr_wrapped {
                out.line(format!("{}: TypeAlias = {}", entity_identifier(wrapper), ident));
                out.line("");
            }
            exported.push(string_literal(&ident));
        }

        out.line("# Interfaces");
        for (name, interface) in &spec.interfaces {
            tracing::debug!("emitting interface {}", name);
            out.line(format!("class {}(Protocol):", entity_identifier(name)));
            if self.emit_methods(emission, &mut out, "interface", name, &interface.methods, false) == 0 {
                out.line(format!("{}pass", INDENT));
            }
            out.line("");
        }

        py.line("");
        py.line(format!("__all__ = [{}]", exported.join(", ")));

        emission.close(out)?;
        emission.close(py)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::spec::{FunctionType, QualifiedName, TypeSpec};
    use crate::targets::EmitOptions;
    use crate::test_support::{
        access_flags_spec, color_enum_spec, custom_map_spec, person_record_spec, sample_spec,
        session_spec,
    };

    fn emit(spec: &Spec) -> (MemorySink, Vec<crate::bindgen::ResolutionIssue>) {
        let target = PythonTarget::new();
        let mut sink = MemorySink::new();
        let mut emission = Emission::new(spec, &target, &mut sink, &EmitOptions::default());
        target.emit(spec, &mut emission).unwrap();
        let (_, issues) = emission.finish();
        (sink, issues)
    }

    #[test]
    fn test_units_and_post_processing() {
        let (sink, _) = emit(&sample_spec());

        assert_eq!(sink.names().collect::<Vec<_>>(), vec!["native.pyi", "native.py"]);
        assert_eq!(sink.unit("native.pyi").unwrap().post_process(), ["black", "mypy"]);
        assert_eq!(sink.unit("native.py").unwrap().post_process(), ["black", "mypy"]);
    }

    #[test]
    fn test_enums() {
        let (sink, _) = emit(&color_enum_spec());
        let pyi = sink.contents("native.pyi").unwrap();
        assert!(pyi.contains("class Color(Enum):\n    Red = \"Red\"\n    Green = \"Green\"\n    Blue = \"Blue\"\n"));

        let (sink, _) = emit(&access_flags_spec());
        let pyi = sink.contents("native.pyi").unwrap();
        assert!(pyi.contains("class Access(IntFlag):\n    Read = 1\n    Write = 2\n    Exec = 4\n"));
    }

    #[test]
    fn test_typed_dict_not_required_iff_default() {
        let (sink, _) = emit(&person_record_spec());
        let pyi = sink.contents("native.pyi").unwrap();

        assert!(pyi.contains("class Person(TypedDict):\n    name: str\n    age: NotRequired[int]\n"));
    }

    #[test]
    fn test_class_stubs() {
        let (sink, _) = emit(&session_spec());
        let pyi = sink.contents("native.pyi").unwrap();

        assert!(pyi.contains("    @staticmethod\n    def create() -> SharedSession: ..."));
        assert!(pyi.contains("    is_closed: bool"));
        assert!(pyi.contains("    @overload\n    def open(self, path: str) -> None: ..."));
        assert!(pyi.contains(
            "    @overload\n    def open(self, path: str, read_only: bool) -> None: ..."
        ));
        assert!(pyi.contains("SharedSession: TypeAlias = Session"));

        let py = sink.contents("native.py").unwrap();
        assert!(py.contains("_bridge = import_module(\"_native\")"));
        assert_eq!(py.matches("Session = _bridge.Session").count(), 1);
        assert!(py.contains("__all__ = [\"Session\"]"));
    }

    #[test]
    fn test_placeholder_quotes_json_arguments() {
        let (sink, issues) = emit(&custom_map_spec());
        let pyi = sink.contents("native.pyi").unwrap();

        let line = pyi.lines().find(|l| l.starts_with("Lookup: TypeAlias")).unwrap();
        assert!(line.starts_with("Lookup: TypeAlias = Annotated[Any, 'unknown: my::CustomMap<["));
        assert!(line.contains(r#""names":["K"]"#));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_function_types_and_modifiers() {
        let mut spec = Spec::default();
        spec.type_aliases.insert(
            "Callback".to_string(),
            FunctionType::new(
                vec![crate::spec::ArgumentSpec::new("count", TypeSpec::named("int"))],
                TypeSpec::named("void"),
            )
            .no_except()
            .into(),
        );

        let (sink, _) = emit(&spec);
        assert!(sink
            .contents("native.pyi")
            .unwrap()
            .contains("Callback: TypeAlias = Annotated[Callable[[int], None], \"noexcept\"]"));
    }

    #[test]
    fn test_indirection_modifiers_are_annotated() {
        let mut spec = Spec::default();
        spec.type_aliases
            .insert("Ptr".to_string(), QualifiedName::new("int").pointer().into());
        spec.type_aliases
            .insert("Ref".to_string(), QualifiedName::new("bool").reference().into());
        spec.type_aliases.insert(
            "Moved".to_string(),
            QualifiedName::new("std::string").rvalue_reference().into(),
        );

        let (sink, issues) = emit(&spec);
        let pyi = sink.contents("native.pyi").unwrap();
        assert!(pyi.contains("Ptr: TypeAlias = Annotated[int, \"pointer\"]"));
        assert!(pyi.contains("Ref: TypeAlias = Annotated[bool, \"reference\"]"));
        assert!(pyi.contains("Moved: TypeAlias = Annotated[str, \"rvalue-reference\"]"));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_keyword_names_are_escaped() {
        assert_eq!(python_identifier("from"), "from_");
        assert_eq!(python_identifier("path"), "path");
    }

    #[test]
    fn test_empty_bodies_use_pass() {
        let mut spec = Spec::default();
        spec.classes.insert("Empty".to_string(), Default::default());
        spec.interfaces.insert("Listener".to_string(), Default::default());

        let (sink, _) = emit(&spec);
        let pyi = sink.contents("native.pyi").unwrap();
        assert!(pyi.contains("class Empty:\n    pass\n"));
        assert!(pyi.contains("class Listener(Protocol):\n    pass\n"));
    }

    #[test]
    fn test_string_literal_quoting() {
        assert_eq!(string_literal("const"), "\"const\"");
        assert_eq!(string_literal(r#"a"b"#), r#"'a"b'"#);
        assert_eq!(string_literal(r#"it's "x""#), r#""it's \"x\"""#);
    }
}
