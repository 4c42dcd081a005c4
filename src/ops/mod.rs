//! High-level operations.
//!
//! This module contains the implementation of bindspec commands.

pub mod generate;

pub use generate::{
    format_report, generate, generate_target, GenerateOptions, GenerationReport, TargetReport,
};
