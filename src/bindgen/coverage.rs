//! Coverage check: does the target have a rendering for everything the spec declares?
//!
//! Advisory only. A target under construction is expected to have gaps;
//! they surface as warnings and as placeholders in the output.

use crate::bindgen::errors::CoverageWarning;
use crate::bindgen::resolver::MappingTable;
use crate::spec::Spec;

/// Compare the spec's declared primitives and templates against a target table.
pub fn check_coverage(spec: &Spec, table: &MappingTable, target: &str) -> Vec<CoverageWarning> {
    let mut warnings = Vec::new();

    for primitive in &spec.primitives {
        if table.primitive(primitive).is_none() {
            warnings.push(CoverageWarning::Primitive(primitive.clone()));
        }
    }

    for template in &spec.templates {
        if table.template(template).is_none() {
            warnings.push(CoverageWarning::Template(template.clone()));
        }
    }

    for warning in &warnings {
        tracing::warn!("{}: {}", target, warning);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindgen::resolver::TemplateMapping;

    static TABLE: MappingTable = MappingTable {
        primitives: &[("bool", "boolean")],
        templates: &[(
            "std::vector",
            TemplateMapping {
                arity: 1,
                render: |args| format!("{}[]", args[0]),
            },
        )],
    };

    #[test]
    fn test_full_coverage() {
        let spec = Spec {
            primitives: vec!["bool".to_string()],
            templates: vec!["std::vector".to_string()],
            ..Default::default()
        };
        assert!(check_coverage(&spec, &TABLE, "test").is_empty());
    }

    #[test]
    fn test_reports_every_gap() {
        let spec = Spec {
            primitives: vec!["bool".to_string(), "float".to_string(), "double".to_string()],
            templates: vec!["std::vector".to_string(), "std::map".to_string()],
            ..Default::default()
        };

        let warnings = check_coverage(&spec, &TABLE, "test");
        assert_eq!(
            warnings,
            vec![
                CoverageWarning::Primitive("float".to_string()),
                CoverageWarning::Primitive("double".to_string()),
                CoverageWarning::Template("std::map".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_spec() {
        assert!(check_coverage(&Spec::default(), &TABLE, "test").is_empty());
    }
}
