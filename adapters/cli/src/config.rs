//! TOML-backed session configuration loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cascade_core::SessionConfig;

/// Loads a session configuration from a TOML file.
pub(crate) fn load(path: &Path) -> Result<SessionConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading session config {}", path.display()))?;
    parse(&raw).with_context(|| format!("parsing session config {}", path.display()))
}

fn parse(raw: &str) -> Result<SessionConfig> {
    Ok(toml::from_str(raw)?)
}
