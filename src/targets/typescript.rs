//! TypeScript backend.
//!
//! Emits three units:
//! - `enums.ts`: const enums, so no JavaScript backs them
//! - `native.d.ts`: declarations for every other entity
//! - `native.js`: the runtime bridge, one export per class

use crate::bindgen::{
    entity_identifier, GenerateError, MappingTable, NamingConvention, TemplateMapping, TypeMapping,
};
use crate::spec::{MethodTable, Spec};
use crate::targets::{
    enum_members, member_location, Emission, EnumMember, Target, TargetId, GENERATED_BANNER,
};

/// Post-processing steps for every TypeScript unit.
const STEPS: &[&str] = &["eslint", "typescript-checker"];

static TYPESCRIPT_TABLE: MappingTable = MappingTable {
    primitives: &[
        ("void", "void"),
        ("bool", "boolean"),
        ("int", "number"),
        ("int64_t", "bigint"),
        ("int32_t", "number"),
        ("uint64_t", "bigint"),
        ("std::string", "string"),
        ("StringData", "string | null"),
        ("BinaryData", "ArrayBuffer | null"),
        ("OwnedBinaryData", "ArrayBuffer | null"),
    ],
    templates: &[
        (
            "std::vector",
            TemplateMapping {
                arity: 1,
                render: |args| format!("({})[]", args[0]),
            },
        ),
        (
            "util::Optional",
            TemplateMapping {
                arity: 1,
                render: |args| format!("({}) | undefined", args[0]),
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

/// TypeScript type syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptMapping;

impl TypeMapping for TypeScriptMapping {
    fn table(&self) -> &'static MappingTable {
        &TYPESCRIPT_TABLE
    }

    fn naming(&self) -> NamingConvention {
        NamingConvention::CamelCase
    }

    fn readonly(&self, inner: &str) -> String {
        format!("Readonly<{}>", inner)
    }

    fn function(&self, arguments: &[(String, String)], ret: &str) -> String {
        format!("({}) => {}", signature_arguments(arguments), ret)
    }

    fn annotate(&self, rendered: &str, modifiers: &[&str]) -> String {
        format!("{} {}", rendered, comment(&modifiers.join(" ")))
    }

    fn placeholder(&self, detail: &str) -> String {
        format!("unknown {}", comment(detail))
    }
}

/// Block comment that survives any content.
fn comment(text: &str) -> String {
    format!("/* {} */", text.replace("*/", "*\\/"))
}

fn signature_arguments(arguments: &[(String, String)]) -> String {
    arguments
        .iter()
        .map(|(name, ty)| format!("{}: {}", name, ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The TypeScript target.
#[derive(Debug, Clone, Default)]
pub struct TypeScriptTarget {
    mapping: TypeScriptMapping,
}

impl TypeScriptTarget {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit_enums(&self, spec: &Spec, emission: &mut Emission<'_>) -> Result<(), GenerateError> {
        let mut out = emission.open("enums.ts", STEPS);
        out.line(format!("// {}", GENERATED_BANNER));

        out.line("// Enums");
        for (name, e) in &spec.enums {
            tracing::debug!("emitting enum {}", name);
            let members = enum_members(self.id(), name, e)?;

            out.line(format!("export const enum {} {{", entity_identifier(name)));
            for member in members {
                match member {
                    EnumMember::Named(member) => out.line(format!("  {} = \"{}\",", member, member)),
                    EnumMember::Flag(member, value) => out.line(format!("  {} = {},", member, value)),
                }
            }
            out.line("};");
        }

        emission.close(out)
    }

    fn emit_methods(
        &self,
        emission: &mut Emission<'_>,
        out: &mut crate::output::OutputUnit,
        kind: &str,
        owner: &str,
        methods: &MethodTable,
        prefix: &str,
    ) {
        for (name, overloads) in methods {
            emission.resolver.at(member_location(kind, owner, name));
            for method in overloads {
                let arguments = emission.resolver.resolve_arguments(&method.sig.arguments);
                let ret = emission.resolver.resolve(&method.sig.ret);
                out.line(format!(
                    "  {}{}({}): {};",
                    prefix,
                    self.naming().apply(name),
                    signature_arguments(&arguments),
                    ret
                ));
            }
        }
    }
}

impl Target for TypeScriptTarget {
    fn id(&self) -> TargetId {
        TargetId::TypeScript
    }

    fn mapping(&self) -> &dyn TypeMapping {
        &self.mapping
    }

    fn description(&self) -> &'static str {
        "TypeScript declarations with a Node.js bindings bridge"
    }

    fn default_bridge_module(&self) -> &'static str {
        "native.node"
    }

    fn emit(&self, spec: &Spec, emission: &mut Emission<'_>) -> Result<(), GenerateError> {
        self.emit_enums(spec, emission)?;

        let mut js = emission.open("native.js", STEPS);
        js.line(format!("// {}", GENERATED_BANNER));
        js.line("import bindings from 'bindings';");

        let mut out = emission.open("native.d.ts", STEPS);
        out.line(format!("// {}", GENERATED_BANNER));

        if !spec.enums.is_empty() {
            let enums: Vec<String> = spec.enums.keys().map(|n| entity_identifier(n)).collect();
            out.line(format!("import {{ {} }} from \"./enums\";", enums.join(", ")));
            out.line(format!("export {{ {} }};", enums.join(", ")));
        }

        out.line("// Opaque types");
        for name in &spec.opaque_types {
            out.lines([
                "/** Using an empty enum to express a nominal type */".to_string(),
                format!("export declare enum {} {{}}", entity_identifier(name)),
            ]);
        }

        out.line("// Type aliases");
        for (name, ty) in &spec.type_aliases {
            emission.resolver.at(format!("type alias {}", name));
            let rendered = emission.resolver.resolve(ty);
            out.line(format!("export type {} = {};", entity_identifier(name), rendered));
        }

        out.line("// Records");
        for (name, record) in &spec.records {
            tracing::debug!("emitting record {}", name);
            out.line(format!("export type {} = {{", entity_identifier(name)));
            for (field_name, field) in &record.fields {
                emission.resolver.at(format!("record {}.{}", name, field_name));
                let rendered = emission.resolver.resolve(&field.ty);
                let optional = if field.is_optional() { "?" } else { "" };
                out.line(format!(
                    "  {}{}: {};",
                    self.naming().apply(field_name),
                    optional,
                    rendered
                ));
            }
            out.line("};");
        }

        out.line("// Classes");
        for (name, class) in &spec.classes {
            tracing::debug!("emitting class {}", name);
            let ident = entity_identifier(name);
            js.line(format!(
                "export const {{ {} }} = bindings(\"{}\");",
                ident,
                emission.bridge_module()
            ));

            out.line(format!("export class {} {{", ident));
            self.emit_methods(emission, &mut out, "class", name, &class.static_methods, "static ");
            for (property, ty) in &class.properties {
                emission.resolver.at(format!("class {}.{}", name, property));
                let rendered = emission.resolver.resolve(ty);
                out.line(format!("  {}: {};", self.naming().apply(property), rendered));
            }
            self.emit_methods(emission, &mut out, "class", name, &class.methods, "");
            out.line("}");

            if let Some(ref wrapper) = class.shared_ptr_wrapped {
                out.line(format!("export type {} = {};", entity_identifier(wrapper), ident));
            }
        }

        out.line("// Interfaces");
        for (name, interface) in &spec.interfaces {
            tracing::debug!("emitting interface {}", name);
            out.line(format!("export interface {} {{", entity_identifier(name)));
            self.emit_methods(emission, &mut out, "interface", name, &interface.methods, "");
            out.line("}");
        }

        emission.close(out)?;
        emission.close(js)
    }
}
