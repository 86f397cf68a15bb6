//! Command handlers for vacmap CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod convert;
pub mod guess;
pub mod inspect;
pub mod render;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use vacmap::metadata::RECORD_FILE;
use vacmap::{DeviceProfile, MapRecord};

use crate::config::Config;

/// Load the profile given on the command line, else the configured default,
/// else built-in defaults
pub fn load_profile(explicit: Option<&Path>, config: &Config) -> Result<DeviceProfile> {
    let Some(path) = explicit.or(config.default_profile.as_deref()) else {
        tracing::debug!("No device profile given, using defaults");
        return Ok(DeviceProfile::default());
    };

    DeviceProfile::load(path)
        .with_context(|| format!("Failed to load device profile {}", path.display()))
}

/// File stem of `path` for naming derived outputs
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map".to_string())
}

/// `map_record.json` next to a dump, if there is one
pub fn sibling_record(input: &Path) -> Result<Option<MapRecord>> {
    let Some(path) = input.parent().map(|dir| dir.join(RECORD_FILE)) else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(record))
}
