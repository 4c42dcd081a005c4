//! Naming-convention transforms.
//!
//! Spec names are usually `snake_case` native identifiers. Each target picks
//! a [`NamingConvention`] for the identifiers it exposes. Conversions are
//! pure and deterministic; collisions are caught by spec validation.

use serde::{Deserialize, Serialize};

/// Identifier casing used by a target for members and fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// `getObjectSchema`
    CamelCase,
    /// `get_object_schema`
    SnakeCase,
    /// Leave names untouched.
    Verbatim,
}

impl NamingConvention {
    /// Apply this convention to a spec identifier.
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingConvention::CamelCase => camel_case(name),
            NamingConvention::SnakeCase => snake_case(name),
            NamingConvention::Verbatim => name.to_string(),
        }
    }
}

/// How a target turns spec names into the identifiers it emits.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierRules {
    pub naming: NamingConvention,

    /// Final rewrite of every identifier, e.g. escaping reserved words.
    pub escape: fn(&str) -> String,
}

impl IdentifierRules {
    pub fn new(naming: NamingConvention) -> Self {
        IdentifierRules {
            naming,
            escape: str::to_string,
        }
    }

    pub fn with_escape(mut self, escape: fn(&str) -> String) -> Self {
        self.escape = escape;
        self
    }

    /// A field, member, or argument name.
    pub fn member(&self, name: &str) -> String {
        (self.escape)(&self.naming.apply(name))
    }

    /// An enum member name. Enum members keep their spelling.
    pub fn enum_member(&self, name: &str) -> String {
        (self.escape)(name)
    }
}

impl From<NamingConvention> for IdentifierRules {
    fn from(naming: NamingConvention) -> Self {
        IdentifierRules::new(naming)
    }
}

/// Split an identifier into lowercase words.
///
/// Word boundaries are separators (`_`, `-`, whitespace), lower-to-upper
/// transitions (`objectSchema`), and the end of an acronym (`URLPath`).
/// Digits stay attached to the preceding word.
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `get_object_schema` → `getObjectSchema`.
pub fn camel_case(name: &str) -> String {
    let words = split_words(name);
    let mut out = String::with_capacity(name.len());
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// `getObjectSchema` → `get_object_schema`.
pub fn snake_case(name: &str) -> String {
    split_words(name).join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("get_object_schema"), "getObjectSchema");
        assert_eq!(camel_case("is_valid"), "isValid");
        assert_eq!(camel_case("isValid"), "isValid");
        assert_eq!(camel_case("URLPath"), "urlPath");
        assert_eq!(camel_case("int64_value"), "int64Value");
        assert_eq!(camel_case("open"), "open");
        assert_eq!(camel_case("_private_name"), "privateName");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("getObjectSchema"), "get_object_schema");
        assert_eq!(snake_case("get_object_schema"), "get_object_schema");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("sync-session"), "sync_session");
    }

    #[test]
    fn test_convention_apply() {
        assert_eq!(NamingConvention::CamelCase.apply("read_only"), "readOnly");
        assert_eq!(NamingConvention::SnakeCase.apply("readOnly"), "read_only");
        assert_eq!(NamingConvention::Verbatim.apply("read_only"), "read_only");
    }

    #[test]
    fn test_distinct_names_can_collide() {
        assert_eq!(camel_case("is_open"), camel_case("isOpen"));
    }

    #[test]
    fn test_identifier_rules_escape_after_case_conversion() {
        fn reserved(name: &str) -> String {
            if name == "class" {
                "class_".to_string()
            } else {
                name.to_string()
            }
        }

        let rules = IdentifierRules::new(NamingConvention::SnakeCase).with_escape(reserved);
        assert_eq!(rules.member("Class"), "class_");
        assert_eq!(rules.enum_member("class"), "class_");
        assert_eq!(rules.enum_member("Class"), "Class");

        let plain = IdentifierRules::from(NamingConvention::CamelCase);
        assert_eq!(plain.member("read_only"), "readOnly");
        assert_eq!(plain.enum_member("read_only"), "read_only");
    }
}
