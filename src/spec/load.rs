//! Reading a spec document from disk.
//!
//! The spec itself is produced by an external stage; this is only the thin
//! adapter that deserializes its JSON or TOML rendering into a [`Spec`].

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::Spec;

/// Serialized spec formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Toml,
}

impl SpecFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(SpecFormat::Json),
            "toml" => Some(SpecFormat::Toml),
            _ => None,
        }
    }
}

/// Load a spec file, picking the format from its extension.
pub fn load_spec(path: &Path) -> Result<Spec> {
    let Some(format) = SpecFormat::from_path(path) else {
        bail!(
            "unsupported spec format: {} (expected a .json or .toml file)",
            path.display()
        );
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read spec: {}", path.display()))?;

    let spec = parse_spec(&contents, format)
        .with_context(|| format!("failed to parse spec: {}", path.display()))?;

    tracing::debug!(
        "loaded {} entities from {}",
        spec.entity_count(),
        path.display()
    );
    Ok(spec)
}

/// Parse spec contents in the given format.
pub fn parse_spec(contents: &str, format: SpecFormat) -> Result<Spec> {
    let spec = match format {
        SpecFormat::Json => serde_json::from_str(contents)?,
        SpecFormat::Toml => toml::from_str(contents)?,
    };
    Ok(spec)
}
