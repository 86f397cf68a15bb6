//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up vacmap CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
///
/// # Arguments
/// * `profile` - Optional device profile to use by default
/// * `output_dir` - Optional directory for output images
/// * `show` - If true, show current configuration
pub fn handle(profile: Option<PathBuf>, output_dir: Option<PathBuf>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if !apply(&mut config, profile, output_dir) {
        show_usage();
        return Ok(());
    }

    let path = config.save()?;
    show_config(&config);
    println!("Config saved to: {}", path.display());

    Ok(())
}

/// Apply the given settings; returns false if there was nothing to set
fn apply(config: &mut Config, profile: Option<PathBuf>, output_dir: Option<PathBuf>) -> bool {
    let changed = profile.is_some() || output_dir.is_some();
    if let Some(profile) = profile {
        config.default_profile = Some(profile);
    }
    if let Some(dir) = output_dir {
        config.output_dir = Some(dir);
    }
    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.default_profile {
        Some(path) => println!("Default profile: {}", path.display()),
        None => println!("No default profile configured"),
    }
    match &config.output_dir {
        Some(dir) => println!("Output directory: {}", dir.display()),
        None => println!("Output directory: current directory"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: vacmap configure --profile PATH");
    println!("   or: vacmap configure --output-dir DIR");
    println!("   or: vacmap configure --show");
    println!();
    println!("Note: A profile holds the offsets, encodings, strides, value table");
    println!("      and colors that work for one vacuum model.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_usage_does_not_panic() {
        show_usage();
    }

    #[test]
    fn test_apply_nothing() {
        let mut config = Config::default();
        assert!(!apply(&mut config, None, None));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut config = Config {
            default_profile: Some(PathBuf::from("s5.toml")),
            output_dir: None,
        };
        assert!(apply(&mut config, None, Some(PathBuf::from("www"))));
        assert_eq!(config.default_profile, Some(PathBuf::from("s5.toml")));
        assert_eq!(config.output_dir, Some(PathBuf::from("www")));
    }
}
