//! In-memory sink, used for dry runs and tests.

use anyhow::Result;
use indexmap::IndexMap;

use super::{OutputSink, OutputUnit, UnitSummary};

/// Keeps closed units in memory, in close order.
#[derive(Debug, Default)]
pub struct MemorySink {
    units: IndexMap<String, OutputUnit>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of a closed unit.
    pub fn contents(&self, name: &str) -> Option<String> {
        self.units.get(name).map(OutputUnit::render)
    }

    /// A closed unit.
    pub fn unit(&self, name: &str) -> Option<&OutputUnit> {
        self.units.get(name)
    }

    /// Names of closed units, in close order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Consume the sink, returning every closed unit.
    pub fn into_units(self) -> Vec<OutputUnit> {
        self.units.into_values().collect()
    }
}

impl OutputSink for MemorySink {
    fn close(&mut self, unit: OutputUnit) -> Result<UnitSummary> {
        let summary = UnitSummary {
            name: unit.name().to_string(),
            path: None,
            lines: unit.contents().len(),
            post_process: Vec::new(),
        };
        self.units.insert(unit.name().to_string(), unit);
        Ok(summary)
    }
}
