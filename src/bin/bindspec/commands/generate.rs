//! `bindspec generate` command

use anyhow::Result;

use super::{finish, parse_targets, Outcome};
use crate::cli::GenerateArgs;
use bindspec::ops::{generate, GenerateOptions};
use bindspec::spec::load_spec;
use bindspec::targets::TargetRegistry;
use bindspec::util::config::{global_config_path, load_config, project_config_path};

pub fn execute(args: GenerateArgs, color: bool) -> Result<Outcome> {
    let spec = load_spec(&args.spec)?;

    let cwd = std::env::current_dir()?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));

    // CLI > config > every target
    let targets = if args.targets.is_empty() {
        parse_targets(&config.generate.targets)?
    } else {
        parse_targets(&args.targets)?
    };

    let options = GenerateOptions {
        targets,
        output_dir: args.output.unwrap_or_else(|| config.output_dir()),
        bridge_module: args
            .bridge_module
            .or_else(|| config.bridge_module().map(str::to_string)),
        post_process: !args.no_post_process && config.generate.post_process,
        clean: args.clean,
        dry_run: args.dry_run,
        config,
    };

    tracing::debug!(
        "generating {} entities into {}",
        spec.entity_count(),
        options.output_dir.display()
    );

    let report = generate(&spec, &TargetRegistry::new(), &options)?;
    finish(&report, &args.spec, args.json, color)
}
