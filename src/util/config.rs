//! Configuration file support for bindspec.
//!
//! bindspec reads configuration from two locations:
//! - Global: `~/.bindspec/config.toml` - User-wide defaults
//! - Project: `./bindspec.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// bindspec configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generate: GenerateConfig,

    /// Post-processing command overrides, keyed by step name
    pub post_process: BTreeMap<String, PostProcessCommand>,
}

/// Generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Output directory (one subdirectory per target)
    pub output_dir: Option<PathBuf>,

    /// Targets generated when none are given on the command line
    pub targets: Vec<String>,

    /// Runtime module the generated bridge loads the native classes from
    pub bridge_module: Option<String>,

    /// Run post-processing steps after each output unit is written
    #[serde(default = "default_true")]
    pub post_process: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            output_dir: None,
            targets: Vec::new(),
            bridge_module: None,
            post_process: true,
        }
    }
}

/// External command for one post-processing step.
///
/// The path of the output unit is appended as the final argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessCommand {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl PostProcessCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        PostProcessCommand {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "bindings";

fn default_true() -> bool {
    true
}

/// Built-in command for a known post-processing step.
pub fn builtin_post_process(step: &str) -> Option<PostProcessCommand> {
    match step {
        "eslint" => Some(PostProcessCommand::new("npx", &["eslint", "--fix"])),
        "typescript-checker" => Some(PostProcessCommand::new("npx", &["tsc", "--noEmit"])),
        "black" => Some(PostProcessCommand::new("black", &["-q"])),
        "mypy" => Some(PostProcessCommand::new("mypy", &[])),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.generate.output_dir.is_some() {
            self.generate.output_dir = other.generate.output_dir;
        }
        if !other.generate.targets.is_empty() {
            self.generate.targets = other.generate.targets;
        }
        if other.generate.bridge_module.is_some() {
            self.generate.bridge_module = other.generate.bridge_module;
        }
        if !other.generate.post_process {
            self.generate.post_process = false;
        }

        self.post_process.extend(other.post_process);
    }

    /// Command for a post-processing step: configured override, then built-in.
    pub fn post_process_command(&self, step: &str) -> Option<PostProcessCommand> {
        self.post_process
            .get(step)
            .cloned()
            .or_else(|| builtin_post_process(step))
    }

    /// Output directory, or the default.
    pub fn output_dir(&self) -> PathBuf {
        self.generate
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Configured bridge module name. Targets fall back to their own default.
    pub fn bridge_module(&self) -> Option<&str> {
        self.generate.bridge_module.as_deref()
    }
}

/// Get the global bindspec config directory (~/.bindspec).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".bindspec"))
}

/// Get the global config path (~/.bindspec/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (./bindspec.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join("bindspec.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (bindspec.toml)
/// 2. Global config (~/.bindspec/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
