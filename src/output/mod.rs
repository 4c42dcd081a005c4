//! Output units and the sinks that finalize them.
//!
//! A target opens one [`OutputUnit`] per generated file, writes lines into
//! it, and hands it back to the sink with [`OutputSink::close`]. Nothing is
//! persisted before `close`, so a reader never sees a partially written unit.
//! Post-processing (formatting, type-checking) runs at close time.

pub mod directory;
pub mod memory;

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use directory::DirectorySink;
pub use memory::MemorySink;

/// A named output file being accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    name: String,
    lines: Vec<String>,
    post_process: Vec<String>,
}

impl OutputUnit {
    /// Create an empty unit with its post-processing steps.
    pub fn new(name: impl Into<String>, post_process: &[&str]) -> Self {
        OutputUnit {
            name: name.into(),
            lines: Vec::new(),
            post_process: post_process.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// File name of the unit, relative to the sink root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one line built from space-separated parts.
    pub fn write(&mut self, parts: &[&str]) {
        self.lines.push(parts.join(" "));
    }

    /// Append one line.
    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append several lines.
    pub fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// Lines written so far.
    pub fn contents(&self) -> &[String] {
        &self.lines
    }

    /// Post-processing steps to run once the unit is closed.
    pub fn post_process(&self) -> &[String] {
        &self.post_process
    }

    /// The full text of the unit, newline-terminated.
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Destination for finished output units.
pub trait OutputSink {
    /// Start a new unit.
    fn open(&mut self, name: &str, post_process: &[&str]) -> OutputUnit {
        OutputUnit::new(name, post_process)
    }

    /// Finalize a unit: persist it and run its post-processing steps.
    fn close(&mut self, unit: OutputUnit) -> Result<UnitSummary>;
}

/// Outcome of one post-processing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepOutcome {
    Passed { step: String },
    Failed { step: String, message: String },
    Skipped { step: String, reason: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

/// What happened to a closed unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub name: String,

    /// Where the unit was written, if it was persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    pub lines: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_process: Vec<StepOutcome>,
}
