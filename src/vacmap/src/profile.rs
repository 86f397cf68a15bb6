//! Per-device decode, classification and render settings
//!
//! A profile is a TOML or YAML file. Every field has a default, so an empty
//! file is valid and only the settings that differ need to be written down.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::candidate::{ByteOrder, CandidateSpace, Encoding, OffsetRange, Order, COMMON_OFFSETS};
use crate::classify::{Rule, ValueTable};
use crate::guess::GuessFilter;
use crate::palette::Palette;
use crate::render::{RenderOptions, Transform};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub decode: DecodeProfile,
    pub classify: ClassifyProfile,
    pub render: RenderProfile,
}

impl DeviceProfile {
    /// Load a profile, picking the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let parsed: std::result::Result<DeviceProfile, String> = match extension.as_deref() {
            Some("toml") => toml::from_str(&contents).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .or_else(|e| {
                    // serde_yaml rejects a document with no content
                    if contents.trim().is_empty() {
                        Ok(DeviceProfile::default())
                    } else {
                        Err(e)
                    }
                })
                .map_err(|e| e.to_string()),
            _ => Err("expected a .toml, .yaml or .yml extension".to_string()),
        };

        let profile: DeviceProfile = parsed.map_err(|message| Error::Profile {
            path: path.to_path_buf(),
            message,
        })?;

        // Fail on a bad preset now rather than halfway through a run
        profile
            .classify
            .table()
            .map_err(|message| Error::Profile {
                path: path.to_path_buf(),
                message,
            })?;

        tracing::debug!("Loaded device profile {}", path.display());
        Ok(profile)
    }
}

/// Candidate layouts to try
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeProfile {
    pub offsets: Vec<usize>,
    /// Sweep tried after `offsets`
    pub offset_range: Option<OffsetRange>,
    pub encodings: Vec<Encoding>,
    pub strides: Vec<usize>,
    pub orders: Vec<Order>,
    pub byte_order: ByteOrder,
    /// Fixed row count; trailing bytes are ignored when set
    pub rows: Option<usize>,
    pub skip_uniform: bool,
}

impl Default for DecodeProfile {
    fn default() -> Self {
        Self {
            offsets: COMMON_OFFSETS.to_vec(),
            offset_range: None,
            encodings: vec![Encoding::U8],
            strides: Vec::new(),
            orders: vec![Order::RowMajor],
            byte_order: ByteOrder::Little,
            rows: None,
            skip_uniform: true,
        }
    }
}

impl DecodeProfile {
    pub fn space(&self) -> CandidateSpace {
        CandidateSpace {
            offsets: self.offsets.clone(),
            offset_range: self.offset_range,
            encodings: self.encodings.clone(),
            strides: self.strides.clone(),
            orders: self.orders.clone(),
            byte_order: self.byte_order,
            rows: self.rows,
        }
    }

    pub fn filter(&self) -> GuessFilter {
        GuessFilter {
            skip_uniform: self.skip_uniform,
        }
    }
}

/// Value table selection. Explicit `rules` take precedence over `preset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyProfile {
    pub preset: Option<String>,
    pub rules: Vec<Rule>,
}

impl ClassifyProfile {
    /// Resolve to a table, defaulting to the occupancy layout
    pub fn table(&self) -> std::result::Result<ValueTable, String> {
        if !self.rules.is_empty() {
            return Ok(ValueTable::new(self.rules.clone()));
        }

        match self.preset.as_deref() {
            None => Ok(ValueTable::occupancy()),
            Some(name) => ValueTable::preset(name).ok_or_else(|| {
                format!(
                    "unknown value table preset '{}' (known: {})",
                    name,
                    ValueTable::PRESETS.join(", ")
                )
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderProfile {
    pub scale: u32,
    pub marker_radius: u32,
    pub transform: Transform,
    pub palette: Palette,
}

impl Default for RenderProfile {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            scale: options.scale,
            marker_radius: options.marker_radius,
            transform: options.transform,
            palette: Palette::default(),
        }
    }
}

impl RenderProfile {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            scale: self.scale.max(1),
            marker_radius: self.marker_radius,
            transform: self.transform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Category, SemanticCell};
    use crate::palette::Color;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_toml_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "s5.toml",
            r##"
[decode]
offsets = [0, 16]
encodings = ["u8", "uint16"]
strides = [170]
orders = ["row-major", "column-major"]
rows = 190

[classify]
preset = "segments"

[render]
scale = 2
transform = "flip-vertical"

[render.palette]
wall = "#282828"
"##,
        );

        let profile = DeviceProfile::load(&path).unwrap();
        assert_eq!(profile.decode.offsets, vec![0, 16]);
        assert_eq!(profile.decode.encodings, vec![Encoding::U8, Encoding::U16]);
        assert_eq!(profile.decode.space().len(), 8);
        assert_eq!(profile.decode.rows, Some(190));
        assert!(profile.decode.skip_uniform);

        let table = profile.classify.table().unwrap();
        assert_eq!(table.lookup(4), SemanticCell::Room(4));

        let options = profile.render.options();
        assert_eq!(options.scale, 2);
        assert_eq!(options.marker_radius, 3);
        assert_eq!(options.transform, Transform::FlipVertical);
        assert_eq!(profile.render.palette.wall, Color::rgb(40, 40, 40));
        assert_eq!(profile.render.palette.free, Palette::default().free);
    }

    #[test]
    fn test_load_yaml_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "robot.yml",
            r##"
decode:
  strides: [64]
  byte_order: big
  skip_uniform: false
classify:
  rules:
    - { min: 0, max: 0, category: free }
    - { min: 1, max: 255, category: wall }
render:
  transform: rotate-180
"##,
        );

        let profile = DeviceProfile::load(&path).unwrap();
        assert_eq!(profile.decode.byte_order, ByteOrder::Big);
        assert!(!profile.decode.filter().skip_uniform);

        let table = profile.classify.table().unwrap();
        assert_eq!(table.lookup(0), SemanticCell::Free);
        assert_eq!(table.lookup(12), SemanticCell::Wall);
        assert_eq!(table.lookup(300), SemanticCell::Unknown);
        assert_eq!(profile.render.transform, Transform::Rotate180);
    }

    #[test]
    fn test_offset_range_in_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "sweep.toml",
            r#"
[decode]
offsets = []
offset_range = { start = 0, end = 1024, step = 4 }
strides = [170]
"#,
        );

        let profile = DeviceProfile::load(&path).unwrap();
        assert_eq!(profile.decode.offset_range, Some(OffsetRange::new(0, 1024, 4)));
        assert_eq!(profile.decode.space().len(), 256);
    }

    #[test]
    fn test_empty_profiles_use_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["empty.toml", "empty.yaml"] {
            let path = write(temp_dir.path(), name, "");
            let profile = DeviceProfile::load(&path).unwrap();
            assert_eq!(profile, DeviceProfile::default(), "{}", name);
        }
        assert_eq!(
            DeviceProfile::default().classify.table().unwrap(),
            ValueTable::occupancy()
        );
    }

    #[test]
    fn test_rules_override_preset() {
        let classify = ClassifyProfile {
            preset: Some("segments".to_string()),
            rules: vec![Rule::exact(0, Category::Wall)],
        };
        assert_eq!(classify.table().unwrap().lookup(0), SemanticCell::Wall);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "bad.toml",
            "[classify]\npreset = \"roborock\"\n",
        );
        let err = DeviceProfile::load(&path).unwrap_err();
        assert!(matches!(err, Error::Profile { ref message, .. } if message.contains("roborock")));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(temp_dir.path(), "profile.json", "{}");
        let err = DeviceProfile::load(&path).unwrap_err();
        assert!(matches!(err, Error::Profile { .. }));
    }

    #[test]
    fn test_bad_color_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "bad.toml",
            "[render.palette]\nwall = \"black\"\n",
        );
        assert!(matches!(
            DeviceProfile::load(&path).unwrap_err(),
            Error::Profile { .. }
        ));
    }

    #[test]
    fn test_missing_profile() {
        let err = DeviceProfile::load("/nonexistent/profile.toml").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
