//! Implementation of `bindspec generate` and `bindspec check`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bindgen::{check_coverage, CoverageWarning, GenerateError, ResolutionIssue};
use crate::output::{DirectorySink, MemorySink, OutputSink, StepOutcome, UnitSummary};
use crate::spec::{validate, Spec};
use crate::targets::{EmitOptions, Emission, Target, TargetId, TargetRegistry};
use crate::util::config::{Config, DEFAULT_OUTPUT_DIR};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::remove_dir_all_if_exists;

/// Options for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Targets to generate (empty = every registered target)
    pub targets: Vec<TargetId>,

    /// Root output directory; each target writes to `<output_dir>/<target>`
    pub output_dir: PathBuf,

    /// Runtime module override for the bridge units
    pub bridge_module: Option<String>,

    /// Run post-processing steps on written units
    pub post_process: bool,

    /// Remove each target's output directory before writing
    pub clean: bool,

    /// Resolve and emit without writing anything
    pub dry_run: bool,

    /// Post-processing command overrides
    pub config: Config,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            targets: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            bridge_module: None,
            post_process: true,
            clean: false,
            dry_run: false,
            config: Config::default(),
        }
    }
}

impl GenerateOptions {
    /// Options for a run that writes nothing.
    pub fn dry_run(targets: Vec<TargetId>) -> Self {
        GenerateOptions {
            targets,
            dry_run: true,
            post_process: false,
            ..Default::default()
        }
    }
}

/// Result of one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: TargetId,

    /// Units closed, in close order
    pub units: Vec<UnitSummary>,

    /// Declared primitives/templates the target has no mapping for
    pub coverage: Vec<CoverageWarning>,

    /// Every placeholder emitted
    pub issues: Vec<ResolutionIssue>,

    /// Why the target was aborted, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Structural violations that aborted the target
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,

    /// Terminal rendering of the abort, with fix suggestions
    #[serde(skip)]
    pub diagnostic: Option<Diagnostic>,
}

impl TargetReport {
    fn new(target: TargetId) -> Self {
        TargetReport {
            target,
            units: Vec::new(),
            coverage: Vec::new(),
            issues: Vec::new(),
            error: None,
            violations: Vec::new(),
            diagnostic: None,
        }
    }

    /// Placeholders grouped by original identifier, with counts.
    pub fn placeholder_summary(&self) -> BTreeMap<&str, usize> {
        let mut summary = BTreeMap::new();
        for issue in &self.issues {
            *summary.entry(issue.identifier.as_str()).or_insert(0) += 1;
        }
        summary
    }

    /// Whether the target was aborted.
    pub fn is_aborted(&self) -> bool {
        self.error.is_some()
    }

    /// Post-processing steps that failed.
    pub fn failed_steps(&self) -> impl Iterator<Item = (&str, &StepOutcome)> {
        self.units.iter().flat_map(|unit| {
            unit.post_process
                .iter()
                .filter(|step| step.is_failure())
                .map(move |step| (unit.name.as_str(), step))
        })
    }

    /// Warnings for post-processing steps that failed on written units.
    pub fn step_diagnostics(&self) -> Vec<Diagnostic> {
        self.failed_steps()
            .filter_map(|(unit, outcome)| match outcome {
                StepOutcome::Failed { step, message } => Some(
                    Diagnostic::warning(format!("{}: {} failed on {}", self.target, step, unit))
                        .with_context(message.clone())
                        .with_suggestion("Run the step by hand, or pass --no-post-process"),
                ),
                _ => None,
            })
            .collect()
    }

    fn abort(&mut self, error: GenerateError) {
        if let GenerateError::InvalidSpec { ref violations, .. } = error {
            self.violations = violations.iter().map(ToString::to_string).collect();
        }
        self.diagnostic = Some(error.to_diagnostic());
        self.error = Some(error.to_string());
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub targets: Vec<TargetReport>,
}

impl GenerationReport {
    /// Whether any target was aborted.
    pub fn has_errors(&self) -> bool {
        self.targets.iter().any(TargetReport::is_aborted)
    }

    /// Total placeholders across every target.
    pub fn placeholder_count(&self) -> usize {
        self.targets.iter().map(|t| t.issues.len()).sum()
    }

    pub fn target(&self, id: TargetId) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.target == id)
    }
}

/// Validate, check coverage, and emit one target through `sink`.
///
/// A structural violation or a sink failure aborts this target only; the
/// returned report records why.
pub fn generate_target(
    spec: &Spec,
    target: &dyn Target,
    sink: &mut dyn OutputSink,
    options: &EmitOptions,
) -> TargetReport {
    let id = target.id();
    let mut report = TargetReport::new(id);

    let violations = validate(spec, target.identifiers());
    if !violations.is_empty() {
        tracing::warn!("{}: spec has {} structural violation(s)", id, violations.len());
        report.abort(GenerateError::InvalidSpec {
            target: id.to_string(),
            violations,
        });
        return report;
    }

    report.coverage = check_coverage(spec, target.mapping().table(), &id.to_string());

    let mut emission = Emission::new(spec, target, sink, options);
    let result = target.emit(spec, &mut emission);
    let (units, issues) = emission.finish();
    report.units = units;
    report.issues = issues;

    for issue in &report.issues {
        tracing::warn!("{}: placeholder for {}", id, issue);
    }

    match result {
        Ok(()) => {
            tracing::info!(
                "{}: generated {} unit(s), {} placeholder(s)",
                id,
                report.units.len(),
                report.issues.len()
            );
        }
        Err(e) => {
            tracing::warn!("{}: {}", id, e);
            report.abort(e);
        }
    }

    report
}

/// Generate every selected target, in parallel.
pub fn generate(
    spec: &Spec,
    registry: &TargetRegistry,
    options: &GenerateOptions,
) -> Result<GenerationReport> {
    let mut ids: Vec<TargetId> = Vec::new();
    let requested: Vec<TargetId> = if options.targets.is_empty() {
        registry.ids().collect()
    } else {
        options.targets.clone()
    };
    // Each target runs at most once.
    for id in requested {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let mut targets = Vec::with_capacity(ids.len());
    for id in ids {
        let target = registry
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("target `{}` is not registered", id))?;
        targets.push(target);
    }

    let emit_options = EmitOptions {
        bridge_module: options.bridge_module.clone(),
    };

    let reports: Vec<TargetReport> = targets
        .par_iter()
        .map(|target| {
            if options.dry_run {
                let mut sink = MemorySink::new();
                return generate_target(spec, *target, &mut sink, &emit_options);
            }

            let root = options.output_dir.join(target.id().to_string());
            if options.clean {
                if let Err(source) = remove_dir_all_if_exists(&root) {
                    tracing::warn!("{}: {:#}", target.id(), source);
                    let mut report = TargetReport::new(target.id());
                    report.abort(GenerateError::Clean { path: root, source });
                    return report;
                }
            }
            let mut sink = DirectorySink::new(root, options.config.clone())
                .with_post_process(options.post_process);
            generate_target(spec, *target, &mut sink, &emit_options)
        })
        .collect();

    Ok(GenerationReport { targets: reports })
}

/// Human-readable summary of a run, keyed by target and identifier.
pub fn format_report(report: &GenerationReport) -> String {
    let mut output = String::new();

    for target in &report.targets {
        if let Some(ref error) = target.error {
            output.push_str(&format!("{}: aborted: {}\n", target.target, error));
            continue;
        }

        output.push_str(&format!("{}: {} unit(s)\n", target.target, target.units.len()));
        for unit in &target.units {
            match unit.path {
                Some(ref path) => output.push_str(&format!("  wrote {}\n", path.display())),
                None => output.push_str(&format!("  {} ({} lines)\n", unit.name, unit.lines)),
            }
        }

        for warning in &target.coverage {
            output.push_str(&format!("  warning: {}\n", warning));
        }

        let summary = target.placeholder_summary();
        if !summary.is_empty() {
            output.push_str(&format!("  placeholders ({}):\n", target.issues.len()));
            for (identifier, count) in summary {
                output.push_str(&format!("    {} x{}\n", identifier, count));
            }
        }

        let failed = target.failed_steps().count();
        if failed > 0 {
            output.push_str(&format!("  post-processing failed: {} step(s)\n", failed));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindgen::IssueKind;
    use crate::spec::EnumSpec;
    use crate::test_support::{custom_map_spec, sample_spec};
    use crate::targets::TypeScriptTarget;
    use tempfile::TempDir;

    fn broken_flags(spec: &mut Spec) {
        spec.enums.insert(
            "Broken".to_string(),
            EnumSpec {
                is_flag: true,
                values: crate::spec::EnumValues::Names(vec!["A".to_string()]),
            },
        );
    }

    #[test]
    fn test_generate_target_collects_coverage_and_issues() {
        let spec = custom_map_spec();
        let target = TypeScriptTarget::new();
        let mut sink = MemorySink::new();

        let report = generate_target(&spec, &target, &mut sink, &EmitOptions::default());

        assert!(!report.is_aborted());
        assert_eq!(report.units.len(), 3);
        assert_eq!(
            report.coverage,
            vec![CoverageWarning::Template("my::CustomMap".to_string())]
        );
        assert_eq!(report.issues[0].kind, IssueKind::UnmappableTemplate);
        assert_eq!(report.placeholder_summary().get("my::CustomMap"), Some(&1));
    }

    #[test]
    fn test_violation_aborts_before_emission() {
        let mut spec = sample_spec();
        broken_flags(&mut spec);
        let target = TypeScriptTarget::new();
        let mut sink = MemorySink::new();

        let report = generate_target(&spec, &target, &mut sink, &EmitOptions::default());

        assert!(report.is_aborted());
        assert!(report.units.is_empty());
        assert_eq!(sink.names().count(), 0);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("Broken"));
    }

    #[test]
    fn test_generate_writes_each_target_directory() {
        let tmp = TempDir::new().unwrap();
        let options = GenerateOptions {
            output_dir: tmp.path().to_path_buf(),
            post_process: false,
            ..Default::default()
        };

        let report = generate(&sample_spec(), &TargetRegistry::new(), &options).unwrap();

        assert!(!report.has_errors());
        assert_eq!(report.targets.len(), 2);
        for name in ["enums.ts", "native.d.ts", "native.js"] {
            assert!(tmp.path().join("typescript").join(name).exists());
        }
        for name in ["native.pyi", "native.py"] {
            assert!(tmp.path().join("python").join(name).exists());
        }
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let options = GenerateOptions {
            output_dir: tmp.path().join("out"),
            ..GenerateOptions::dry_run(vec![TargetId::Python])
        };

        let report = generate(&sample_spec(), &TargetRegistry::new(), &options).unwrap();

        assert_eq!(report.targets.len(), 1);
        assert!(report.target(TargetId::Python).is_some());
        assert!(report.targets[0].units.iter().all(|u| u.path.is_none()));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn test_clean_removes_stale_units() {
        let tmp = TempDir::new().unwrap();
        let stale = tmp.path().join("typescript").join("stale.ts");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "// old").unwrap();

        let options = GenerateOptions {
            targets: vec![TargetId::TypeScript],
            output_dir: tmp.path().to_path_buf(),
            post_process: false,
            clean: true,
            ..Default::default()
        };
        generate(&sample_spec(), &TargetRegistry::new(), &options).unwrap();

        assert!(!stale.exists());
        assert!(tmp.path().join("typescript").join("native.d.ts").exists());
    }

    #[test]
    fn test_duplicate_targets_run_once() {
        let tmp = TempDir::new().unwrap();
        let options = GenerateOptions {
            targets: vec![TargetId::TypeScript, TargetId::Python, TargetId::TypeScript],
            output_dir: tmp.path().to_path_buf(),
            post_process: false,
            clean: true,
            ..Default::default()
        };

        let report = generate(&sample_spec(), &TargetRegistry::new(), &options).unwrap();

        let ids: Vec<TargetId> = report.targets.iter().map(|t| t.target).collect();
        assert_eq!(ids, vec![TargetId::TypeScript, TargetId::Python]);
        assert!(!report.has_errors());
        assert!(tmp.path().join("typescript").join("native.d.ts").exists());
    }

    #[test]
    fn test_failed_clean_aborts_only_that_target() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the TypeScript directory should be cannot be removed as a directory.
        std::fs::write(tmp.path().join("typescript"), "not a directory").unwrap();

        let options = GenerateOptions {
            output_dir: tmp.path().to_path_buf(),
            post_process: false,
            clean: true,
            ..Default::default()
        };
        let report = generate(&sample_spec(), &TargetRegistry::new(), &options).unwrap();

        let ts = report.target(TargetId::TypeScript).unwrap();
        assert!(ts.is_aborted());
        assert!(ts.error.as_deref().unwrap().contains("failed to clean"));
        assert!(ts.diagnostic.is_some());

        let py = report.target(TargetId::Python).unwrap();
        assert!(!py.is_aborted());
        assert!(tmp.path().join("python").join("native.pyi").exists());
    }

    #[test]
    fn test_report_format_lists_placeholders_by_identifier() {
        let mut spec = custom_map_spec();
        spec.type_aliases.insert(
            "Other".to_string(),
            crate::spec::TypeSpec::template(
                "my::CustomMap",
                vec![crate::spec::TypeSpec::named("int")],
            ),
        );

        let report = generate(
            &spec,
            &TargetRegistry::new(),
            &GenerateOptions::dry_run(vec![TargetId::TypeScript]),
        )
        .unwrap();
        let text = format_report(&report);

        assert!(text.starts_with("typescript: 3 unit(s)\n"));
        assert!(text.contains("  placeholders (2):\n    my::CustomMap x2\n"));
        assert!(text.contains("warning: spec declares an unsupported template instance"));
    }

    #[test]
    fn test_one_broken_target_does_not_affect_another() {
        use crate::spec::{FieldSpec, RecordSpec, TypeSpec};

        let mut spec = sample_spec();
        // `v2` and `v_2` are both `v2` in camelCase but stay distinct in snake_case.
        spec.records.insert(
            "Point".to_string(),
            RecordSpec::default()
                .with_field("v2", FieldSpec::required(TypeSpec::named("int")))
                .with_field("v_2", FieldSpec::required(TypeSpec::named("int"))),
        );

        let report = generate(&spec, &TargetRegistry::new(), &GenerateOptions::dry_run(vec![])).unwrap();

        assert!(report.has_errors());
        let ts = report.target(TargetId::TypeScript).unwrap();
        assert!(ts.is_aborted());
        assert!(ts.violations[0].contains("both become `v2`"));

        let py = report.target(TargetId::Python).unwrap();
        assert!(!py.is_aborted());
        assert_eq!(py.units.len(), 2);
    }

    #[test]
    fn test_failed_steps_become_warnings() {
        let mut report = TargetReport::new(TargetId::Python);
        report.units.push(UnitSummary {
            name: "native.pyi".to_string(),
            path: None,
            lines: 10,
            post_process: vec![
                StepOutcome::Passed {
                    step: "black".to_string(),
                },
                StepOutcome::Failed {
                    step: "mypy".to_string(),
                    message: "exit status: 1".to_string(),
                },
            ],
        });

        let diagnostics = report.step_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        let text = diagnostics[0].format(false);
        assert!(text.starts_with("warning: python: mypy failed on native.pyi"));
        assert!(text.contains("  - exit status: 1"));

        let summary = format_report(&GenerationReport {
            targets: vec![report],
        });
        assert!(summary.contains("  post-processing failed: 1 step(s)\n"));
    }

    #[test]
    fn test_escaped_enum_collision_aborts_python_only() {
        let mut spec = sample_spec();
        spec.enums
            .insert("Keyword".to_string(), EnumSpec::plain(["from", "from_"]));

        let report = generate(&spec, &TargetRegistry::new(), &GenerateOptions::dry_run(vec![])).unwrap();

        let py = report.target(TargetId::Python).unwrap();
        assert!(py.is_aborted());
        assert!(py.violations[0].contains("enum Keyword"));
        assert!(!report.target(TargetId::TypeScript).unwrap().is_aborted());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = generate(
            &custom_map_spec(),
            &TargetRegistry::new(),
            &GenerateOptions::dry_run(vec![TargetId::TypeScript]),
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["targets"][0]["target"], "typescript");
        assert_eq!(json["targets"][0]["issues"][0]["identifier"], "my::CustomMap");
        assert_eq!(json["targets"][0]["issues"][0]["kind"], "unmappable-template");
    }
}
