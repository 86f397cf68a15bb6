//! Map directory conversion
//!
//! Reads the dump together with its JSON sidecars, decodes it with the
//! recorded width and height, and exports the dashboard image. A segment map,
//! when present, colors free space by room.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use vacmap::{CellGrid, Exported, MapDirectory, RawMapBuffer, Scene, Transform, ValueTable};

use super::{load_profile, render::DEFAULT_OUTPUT};
use crate::config::Config;

pub struct Options<'a> {
    pub dir: &'a Path,
    pub profile: Option<&'a Path>,
    pub offset: usize,
    /// Overrides `map.segmentmap` in the directory
    pub segments: Option<&'a Path>,
    pub segment_offset: Option<usize>,
    pub scale: Option<u32>,
    pub transform: Option<Transform>,
    pub no_zones: bool,
    pub output: Option<&'a Path>,
}

/// Handle the convert command
pub fn handle(opts: &Options<'_>) -> Result<()> {
    let config = Config::load()?;
    let written = run(opts, &config)?;

    println!("PNG:    {}", written.png_path.display());
    println!("Base64: {}", written.base64_path.display());
    Ok(())
}

pub fn run(opts: &Options<'_>, config: &Config) -> Result<Exported> {
    let profile = load_profile(opts.profile, config)?;
    let map_dir = MapDirectory::load(opts.dir)
        .with_context(|| format!("Failed to load map directory {}", opts.dir.display()))?;

    let candidate = map_dir
        .record
        .candidate(opts.offset)
        .with_byte_order(profile.decode.byte_order);
    let grid = vacmap::decode(&map_dir.map, &candidate).with_context(|| {
        format!(
            "Map data does not fit {}x{} cells at offset {}",
            map_dir.record.width, map_dir.record.height, opts.offset
        )
    })?;

    let table = profile
        .classify
        .table()
        .map_err(anyhow::Error::msg)
        .context("Invalid value table")?;
    let mut cells = vacmap::classify(&grid, &table);
    if let Some(rooms) = segment_layer(opts, &map_dir)? {
        match cells.overlay_rooms(&rooms) {
            Some(merged) => {
                tracing::info!("{} rooms from segment map", merged.room_ids().len());
                cells = merged;
            }
            None => tracing::warn!("Segment map shape differs from the occupancy map, ignoring"),
        }
    }

    let mut scene = Scene::new(&cells);
    match map_dir.charger_cell() {
        Some((x, y)) => {
            tracing::info!("Charger at cell ({}, {})", x, y);
            scene = scene.with_charger(x, y);
        }
        None => tracing::info!("No charger pose, skipping marker"),
    }
    if !opts.no_zones {
        let zones = map_dir.zones();
        tracing::info!("{} zone overlays", zones.len());
        scene = scene.with_zones(zones);
    }

    let mut options = profile.render.options();
    if let Some(scale) = opts.scale {
        options.scale = scale.max(1);
    }
    if let Some(transform) = opts.transform {
        options.transform = transform;
    }

    let image = vacmap::render(&scene, &profile.render.palette, &options)
        .context("Failed to render map")?;

    let output: PathBuf = opts
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_path(DEFAULT_OUTPUT));

    vacmap::export(&image, &output)
        .with_context(|| format!("Failed to export {}", output.display()))
}

/// Decode the segment map with the same window as the occupancy map.
///
/// An explicit `--segments` file must decode; one found in the map directory
/// is skipped with a warning when it does not.
fn segment_layer(opts: &Options<'_>, map_dir: &MapDirectory) -> Result<Option<CellGrid>> {
    let explicit;
    let (buffer, required): (&RawMapBuffer, bool) = match (opts.segments, &map_dir.segments) {
        (Some(path), _) => {
            explicit = vacmap::load(path)
                .with_context(|| format!("Failed to load segment map {}", path.display()))?;
            (&explicit, true)
        }
        (None, Some(found)) => (found, false),
        (None, None) => return Ok(None),
    };

    let offset = opts.segment_offset.unwrap_or(opts.offset);
    let candidate = map_dir.record.candidate(offset);
    match vacmap::decode(buffer, &candidate) {
        Ok(grid) => Ok(Some(vacmap::classify(&grid, &ValueTable::segments()))),
        Err(rejection) if required => Err(rejection).with_context(|| {
            format!(
                "Segment map does not fit {}x{} cells at offset {}",
                map_dir.record.width, map_dir.record.height, offset
            )
        }),
        Err(rejection) => {
            tracing::warn!("Ignoring segment map: {}", rejection);
            Ok(None)
        }
    }
}
