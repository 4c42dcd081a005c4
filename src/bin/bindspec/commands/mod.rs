//! Command implementations

pub mod check;
pub mod completions;
pub mod generate;
pub mod targets;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};

use bindspec::ops::GenerationReport;
use bindspec::targets::TargetId;
use bindspec::util::diagnostic::emit;

/// How a command finished, short of a fatal error.
pub enum Outcome {
    Success,

    /// At least one target was aborted; the others were generated.
    TargetsAborted,
}

/// Whether stderr diagnostics should be colored.
pub fn use_color(no_color: bool) -> bool {
    !no_color && std::io::stderr().is_terminal()
}

/// Parse `--target` values.
pub fn parse_targets(names: &[String]) -> Result<Vec<TargetId>> {
    names
        .iter()
        .map(|name| name.parse::<TargetId>().map_err(|e| anyhow::anyhow!("{}", e)))
        .collect()
}

/// Print the report (text or JSON) and emit diagnostics for failed steps and aborted targets.
pub fn finish(report: &GenerationReport, spec_path: &Path, json: bool, color: bool) -> Result<Outcome> {
    if json {
        let text = serde_json::to_string_pretty(report).context("failed to serialize report")?;
        println!("{}", text);
    } else {
        print!("{}", bindspec::ops::format_report(report));
    }

    for target in &report.targets {
        for warning in target.step_diagnostics() {
            emit(&warning, color);
        }
        if let Some(ref diagnostic) = target.diagnostic {
            emit(&diagnostic.clone().with_location(spec_path), color);
        }
    }

    if report.has_errors() {
        Ok(Outcome::TargetsAborted)
    } else {
        Ok(Outcome::Success)
    }
}
