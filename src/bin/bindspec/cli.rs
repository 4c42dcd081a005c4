//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// bindspec - Generate host-language bindings from a native API spec
#[derive(Parser)]
#[command(name = "bindspec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate bindings for one or more targets
    Generate(GenerateArgs),

    /// Validate a spec and report placeholders without writing anything
    Check(CheckArgs),

    /// List the available targets and their type mappings
    Targets(TargetsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Spec file (.json or .toml)
    pub spec: PathBuf,

    /// Targets to generate (default: config, then every target)
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// Output directory (one subdirectory per target)
    #[arg(short, long, env = "BINDSPEC_OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// Runtime module the bridge loads native classes from
    #[arg(long)]
    pub bridge_module: Option<String>,

    /// Skip linting and type-checking of generated files
    #[arg(long)]
    pub no_post_process: bool,

    /// Remove each target's output directory first
    #[arg(long)]
    pub clean: bool,

    /// Resolve and emit in memory only
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Spec file (.json or .toml)
    pub spec: PathBuf,

    /// Targets to check (default: every target)
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Show the primitive and template tables
    #[arg(long)]
    pub mappings: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
