//! JSON sidecar files written next to a map dump
//!
//! Tuya-based vacuums store the map as `map_record.map` alongside:
//! - `map_record.json`: grid size, resolution (meters per cell) and world origin
//! - `charger_pose.json`: dock position in meters plus heading
//! - `area_info.json`: no-go / no-mop zones and room areas, vertices in centimeters
//! - `map.segmentmap`: room id per cell, same geometry as the occupancy map

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::buffer::{self, RawMapBuffer};
use crate::candidate::{Candidate, Encoding};
use crate::render::{Zone, ZoneKind};
use crate::{Error, Result};

pub const MAP_FILE: &str = "map_record.map";
pub const RECORD_FILE: &str = "map_record.json";
pub const CHARGER_FILE: &str = "charger_pose.json";
pub const AREA_FILE: &str = "area_info.json";
pub const SEGMENT_FILE: &str = "map.segmentmap";

/// Grid geometry from `map_record.json`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub width: usize,
    pub height: usize,
    /// Meters per cell
    pub resolution: f64,
    pub x_min: f64,
    pub y_min: f64,
}

impl MapRecord {
    /// World coordinates (meters) to cell coordinates (column, row),
    /// truncated toward zero. The result may lie outside the grid.
    pub fn world_to_cell(&self, x: f64, y: f64) -> (i64, i64) {
        (
            ((x - self.x_min) / self.resolution) as i64,
            ((y - self.y_min) / self.resolution) as i64,
        )
    }

    /// Reject geometry that cannot place anything on the grid
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(format!("resolution must be positive, got {}", self.resolution));
        }
        if !self.x_min.is_finite() || !self.y_min.is_finite() {
            return Err(format!("origin ({}, {}) is not finite", self.x_min, self.y_min));
        }
        Ok(())
    }

    /// Window-mode candidate reading exactly `width * height` byte cells
    pub fn candidate(&self, offset: usize) -> Candidate {
        Candidate::new(offset, Encoding::U8, self.width).with_rows(self.height)
    }
}

/// Dock pose from `charger_pose.json`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargerPose {
    /// [x, y] in meters
    pub charger_pose: [f64; 2],
    #[serde(default)]
    pub charger_phi: f64,
}

/// One polygon from `area_info.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneArea {
    /// Vertices in centimeters
    #[serde(rename = "vertexs")]
    pub vertices: Vec<[f64; 2]>,
    /// "mop" for no-mop zones; anything else is a full no-go zone
    #[serde(rename = "forbidType", default)]
    pub forbid_type: Option<String>,
}

/// Zones and room areas from `area_info.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaInfo {
    #[serde(rename = "forbidAreaValue", default)]
    pub forbidden: Vec<ZoneArea>,
    #[serde(rename = "areaValue", default)]
    pub rooms: Vec<ZoneArea>,
}

impl AreaInfo {
    /// Convert every area to a cell-space overlay
    pub fn zones(&self, record: &MapRecord) -> Vec<Zone> {
        let to_cells = |area: &ZoneArea| -> Vec<(i64, i64)> {
            area.vertices
                .iter()
                .map(|[x, y]| record.world_to_cell(x / 100.0, y / 100.0))
                .collect()
        };

        let forbidden = self.forbidden.iter().map(|area| {
            let kind = match area.forbid_type.as_deref() {
                Some("mop") => ZoneKind::NoMop,
                _ => ZoneKind::NoGo,
            };
            Zone::new(kind, to_cells(area))
        });
        let rooms = self
            .rooms
            .iter()
            .map(|area| Zone::new(ZoneKind::Room, to_cells(area)));

        forbidden.chain(rooms).collect()
    }
}

/// A vacuum map directory: the dump plus its sidecars
#[derive(Debug, Clone)]
pub struct MapDirectory {
    pub dir: PathBuf,
    pub record: MapRecord,
    pub charger: Option<ChargerPose>,
    pub areas: AreaInfo,
    pub map: RawMapBuffer,
    pub segments: Option<RawMapBuffer>,
}

impl MapDirectory {
    /// Load `map_record.map` and `map_record.json` (required) plus
    /// `charger_pose.json`, `area_info.json` and `map.segmentmap` (optional)
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let record_path = dir.join(RECORD_FILE);
        let record: MapRecord = read_json(&record_path)?;
        record.validate().map_err(|message| Error::InvalidRecord {
            path: record_path,
            message,
        })?;
        let charger = read_optional_json(&dir.join(CHARGER_FILE))?;
        let areas = read_optional_json(&dir.join(AREA_FILE))?.unwrap_or_default();
        let map = buffer::load(dir.join(MAP_FILE))?;
        let segments = match buffer::load(dir.join(SEGMENT_FILE)) {
            Ok(segments) => Some(segments),
            Err(Error::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        tracing::debug!(
            "Map record: {}x{} cells at {} m/cell, origin ({}, {})",
            record.width,
            record.height,
            record.resolution,
            record.x_min,
            record.y_min
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            record,
            charger,
            areas,
            map,
            segments,
        })
    }

    /// Charger position in cell coordinates (column, row)
    pub fn charger_cell(&self) -> Option<(i64, i64)> {
        self.charger.map(|pose| {
            let [x, y] = pose.charger_pose;
            self.record.world_to_cell(x, y)
        })
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.areas.zones(&self.record)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    read_optional_json(path)?.ok_or_else(|| Error::NotFound {
        path: path.to_path_buf(),
    })
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MapRecord {
        MapRecord {
            width: 170,
            height: 190,
            resolution: 0.05,
            x_min: -4.0,
            y_min: -5.0,
        }
    }

    #[test]
    fn test_world_to_cell() {
        let record = record();
        assert_eq!(record.world_to_cell(-4.0, -5.0), (0, 0));
        assert_eq!(record.world_to_cell(0.0, 0.0), (80, 100));
        assert_eq!(record.world_to_cell(0.26, 0.0), (85, 100));
        // Left of the origin lands outside the grid rather than clamping
        assert_eq!(record.world_to_cell(-4.5, -5.0), (-10, 0));
    }

    #[test]
    fn test_record_candidate() {
        let candidate = record().candidate(0);
        assert_eq!(candidate.stride, 170);
        assert_eq!(candidate.rows, Some(190));
        assert_eq!(candidate.encoding, Encoding::U8);
    }

    #[test]
    fn test_area_info_parse_and_zones() {
        let json = r#"{
            "forbidAreaValue": [
                {"vertexs": [[-400, -500], [-300, -500], [-300, -400]], "forbidType": "mop"},
                {"vertexs": [[0, 0], [100, 0], [100, 100]], "forbidType": "all"}
            ],
            "areaValue": [
                {"vertexs": [[0, 0], [50, 0], [50, 50], [0, 50]]}
            ]
        }"#;
        let areas: AreaInfo = serde_json::from_str(json).unwrap();
        assert_eq!(areas.forbidden.len(), 2);
        assert_eq!(areas.rooms.len(), 1);

        let zones = areas.zones(&record());
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].kind, ZoneKind::NoMop);
        assert_eq!(zones[0].vertices, vec![(0, 0), (20, 0), (20, 20)]);
        assert_eq!(zones[1].kind, ZoneKind::NoGo);
        assert_eq!(zones[2].kind, ZoneKind::Room);
        assert_eq!(zones[2].vertices[2], (90, 110));
    }

    #[test]
    fn test_area_info_missing_lists() {
        let areas: AreaInfo = serde_json::from_str("{}").unwrap();
        assert!(areas.forbidden.is_empty());
        assert!(areas.rooms.is_empty());
    }

    #[test]
    fn test_load_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(
            dir.join(RECORD_FILE),
            r#"{"width": 4, "height": 2, "resolution": 0.5, "x_min": 0.0, "y_min": 0.0}"#,
        )
        .unwrap();
        fs::write(
            dir.join(CHARGER_FILE),
            r#"{"charger_pose": [1.2, 0.6], "charger_phi": 1.57}"#,
        )
        .unwrap();
        fs::write(dir.join(MAP_FILE), [0u8; 8]).unwrap();

        let map_dir = MapDirectory::load(dir).unwrap();
        assert_eq!(map_dir.record.width, 4);
        assert_eq!(map_dir.map.len(), 8);
        assert_eq!(map_dir.charger_cell(), Some((2, 1)));
        assert!(map_dir.zones().is_empty());
        assert!(map_dir.segments.is_none());

        fs::write(dir.join(SEGMENT_FILE), [1u8; 8]).unwrap();
        let map_dir = MapDirectory::load(dir).unwrap();
        assert_eq!(map_dir.segments.map(|s| s.len()), Some(8));
    }

    #[test]
    fn test_load_directory_requires_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(MAP_FILE), [0u8; 8]).unwrap();

        let err = MapDirectory::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound { ref path } if path.ends_with(RECORD_FILE)));
    }

    #[test]
    fn test_load_directory_rejects_bad_resolution() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(MAP_FILE), [0u8; 8]).unwrap();

        for resolution in ["0", "-0.05"] {
            fs::write(
                temp_dir.path().join(RECORD_FILE),
                format!(
                    r#"{{"width": 4, "height": 2, "resolution": {}, "x_min": 0, "y_min": 0}}"#,
                    resolution
                ),
            )
            .unwrap();

            let err = MapDirectory::load(temp_dir.path()).unwrap_err();
            let Error::InvalidRecord { message, .. } = err else {
                panic!("expected InvalidRecord for resolution {}", resolution);
            };
            assert!(message.contains("resolution"));
        }
    }

    #[test]
    fn test_validate_record() {
        assert!(record().validate().is_ok());

        let nan = MapRecord {
            resolution: f64::NAN,
            ..record()
        };
        assert!(nan.validate().is_err());

        let far = MapRecord {
            x_min: f64::INFINITY,
            ..record()
        };
        assert!(far.validate().is_err());
    }

    #[test]
    fn test_load_directory_bad_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(RECORD_FILE), "{ not json").unwrap();

        let err = MapDirectory::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::Metadata { .. }));
    }
}
