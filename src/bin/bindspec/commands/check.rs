//! `bindspec check` command
//!
//! Runs validation, coverage, and resolution for each target in memory.

use anyhow::Result;

use super::{finish, parse_targets, Outcome};
use crate::cli::CheckArgs;
use bindspec::ops::{generate, GenerateOptions};
use bindspec::spec::load_spec;
use bindspec::targets::TargetRegistry;

pub fn execute(args: CheckArgs, color: bool) -> Result<Outcome> {
    let spec = load_spec(&args.spec)?;
    let targets = parse_targets(&args.targets)?;

    let report = generate(&spec, &TargetRegistry::new(), &GenerateOptions::dry_run(targets))?;

    let outcome = finish(&report, &args.spec, args.json, color)?;
    if !args.json && !report.has_errors() {
        println!(
            "{}: ok ({} placeholder(s))",
            args.spec.display(),
            report.placeholder_count()
        );
    }
    Ok(outcome)
}
