//! # vacmap
//!
//! Heuristic decoder for robot vacuum floor-map dumps.
//!
//! Vacuum firmware writes its occupancy map as an undocumented binary blob.
//! This library provides functionality to:
//! - Load a dump and fingerprint it
//! - Brute-force candidate (header offset, pixel encoding, row stride) layouts
//! - Classify decoded values into free space, walls, rooms, zones and the charger
//! - Render the classified grid to an RGBA image with charger and zone overlays
//! - Export the image as PNG plus a base64 text file for dashboard embedding
//!
//! Picking the right candidate is left to a human: every viable layout can be
//! rendered side by side and compared against the real floor plan.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use vacmap::{Candidate, Encoding, RenderOptions, ValueTable};
//!
//! let buffer = vacmap::load("map_record.map")?;
//! let candidate = Candidate::new(0, Encoding::U8, 170).with_rows(190);
//!
//! let grid = vacmap::decode(&buffer, &candidate)?;
//! let cells = vacmap::classify(&grid, &ValueTable::occupancy());
//!
//! let scene = vacmap::Scene::new(&cells).with_charger(85, 95);
//! let image = vacmap::render(&scene, &vacmap::Palette::default(), &RenderOptions::default())?;
//!
//! let written = vacmap::export(&image, "vacuum_map.png")?;
//! println!("{}", written.base64_path.display());
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod candidate;
pub mod classify;
pub mod export;
pub mod grid;
pub mod guess;
pub mod metadata;
pub mod palette;
pub mod profile;
pub mod render;

use std::path::PathBuf;

#[doc(inline)]
pub use buffer::{load, RawMapBuffer};
#[doc(inline)]
pub use candidate::{ByteOrder, Candidate, CandidateSpace, Encoding, OffsetRange, Order};
#[doc(inline)]
pub use classify::{classify, CellGrid, Category, Rule, SemanticCell, ValueTable};
#[doc(inline)]
pub use export::{base64_path_for, data_uri, encode_png, export, Exported};
#[doc(inline)]
pub use grid::PixelGrid;
#[doc(inline)]
pub use guess::{decode, guess, Decoded, GuessFilter, GuessReport, Rejection};
#[doc(inline)]
pub use metadata::{AreaInfo, ChargerPose, MapDirectory, MapRecord, ZoneArea};
#[doc(inline)]
pub use palette::{Color, Palette};
#[doc(inline)]
pub use profile::{ClassifyProfile, DecodeProfile, DeviceProfile, RenderProfile};
#[doc(inline)]
pub use render::{render, render_diagnostic, RenderOptions, Scene, Transform, Zone, ZoneKind};

/// Errors produced while loading, decoding or exporting a map
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid metadata in {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid map record {}: {message}", path.display())]
    InvalidRecord { path: PathBuf, message: String },

    #[error("Invalid device profile {}: {message}", path.display())]
    Profile { path: PathBuf, message: String },

    #[error("Candidate rejected: {0}")]
    InvalidCandidate(Rejection),

    #[error("Invalid color '{0}': expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[error("Output image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: u64, height: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Error::InvalidCandidate(rejection)
    }
}
