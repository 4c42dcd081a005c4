//! Filesystem sink: writes each unit on close, then post-processes it.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{OutputSink, OutputUnit, StepOutcome, UnitSummary};
use crate::util::config::Config;
use crate::util::fs::write_string;
use crate::util::process::{find_executable, ProcessBuilder};

/// Writes units under a root directory.
///
/// Post-processing failures never fail the close: the generated file is
/// already on disk, and the step's complaint is reported in the summary.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    config: Config,
    run_post_process: bool,
}

impl DirectorySink {
    /// Create a sink rooted at `root`, resolving step commands from `config`.
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        let run_post_process = config.generate.post_process;
        DirectorySink {
            root: root.into(),
            config,
            run_post_process,
        }
    }

    /// Enable or disable post-processing.
    pub fn with_post_process(mut self, enabled: bool) -> Self {
        self.run_post_process = enabled;
        self
    }

    /// Root directory units are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_step(&self, step: &str, name: &str, path: &Path) -> StepOutcome {
        let Some(command) = self.config.post_process_command(step) else {
            return StepOutcome::Skipped {
                step: step.to_string(),
                reason: "no command configured".to_string(),
            };
        };

        let Some(program) = find_executable(&command.program) else {
            return StepOutcome::Skipped {
                step: step.to_string(),
                reason: format!("`{}` not found in PATH", command.program),
            };
        };

        let process = ProcessBuilder::new(program)
            .args(&command.args)
            .arg(name)
            .cwd(&self.root);

        tracing::debug!("running {}", process.display_command());
        match process.exec_and_check() {
            Ok(_) => StepOutcome::Passed {
                step: step.to_string(),
            },
            Err(e) => {
                tracing::warn!("{} failed on {}: {:#}", step, path.display(), e);
                StepOutcome::Failed {
                    step: step.to_string(),
                    message: format!("{:#}", e),
                }
            }
        }
    }
}

impl OutputSink for DirectorySink {
    fn close(&mut self, unit: OutputUnit) -> Result<UnitSummary> {
        let path = self.root.join(unit.name());
        write_string(&path, &unit.render())?;
        tracing::debug!("wrote {}", path.display());

        let post_process = if self.run_post_process {
            unit.post_process()
                .iter()
                .map(|step| self.run_step(step, unit.name(), &path))
                .collect()
        } else {
            Vec::new()
        };

        Ok(UnitSummary {
            name: unit.name().to_string(),
            path: Some(path),
            lines: unit.contents().len(),
            post_process,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::PostProcessCommand;
    use tempfile::TempDir;

    #[test]
    fn test_close_writes_file() {
        let tmp = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(tmp.path().join("typescript"), Config::default())
            .with_post_process(false);

        let mut unit = sink.open("enums.ts", &["eslint"]);
        unit.line("export const enum Color {");
        unit.line("};");
        let summary = sink.close(unit).unwrap();

        let path = tmp.path().join("typescript").join("enums.ts");
        assert_eq!(summary.path.as_deref(), Some(path.as_path()));
        assert_eq!(summary.lines, 2);
        assert!(summary.post_process.is_empty());
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "export const enum Color {\n};\n"
        );
    }

    #[test]
    fn test_missing_tool_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.post_process.insert(
            "lint".to_string(),
            PostProcessCommand::new("bindspec-missing-linter", &[]),
        );
        let mut sink = DirectorySink::new(tmp.path(), config);

        let unit = sink.open("native.pyi", &["lint", "unknown-step"]);
        let summary = sink.close(unit).unwrap();

        assert_eq!(summary.post_process.len(), 2);
        assert!(matches!(
            &summary.post_process[0],
            StepOutcome::Skipped { reason, .. } if reason.contains("not found")
        ));
        assert!(matches!(
            &summary.post_process[1],
            StepOutcome::Skipped { reason, .. } if reason == "no command configured"
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_step_is_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config
            .post_process
            .insert("check".to_string(), PostProcessCommand::new("false", &[]));
        config
            .post_process
            .insert("format".to_string(), PostProcessCommand::new("true", &[]));
        let mut sink = DirectorySink::new(tmp.path(), config);

        let unit = sink.open("native.js", &["check", "format"]);
        let summary = sink.close(unit).unwrap();

        assert!(summary.post_process[0].is_failure());
        assert_eq!(
            summary.post_process[1],
            StepOutcome::Passed {
                step: "format".to_string()
            }
        );
        assert!(tmp.path().join("native.js").exists());
    }
}
