//! Single-candidate rendering

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use vacmap::{ByteOrder, Candidate, DecodeProfile, Encoding, Exported, Order, Scene, Transform};

use super::load_profile;
use crate::config::Config;

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "vacuum_map.png";

/// Layout flags left unset fall back to the first entry of the profile's
/// decode lists
pub struct Options<'a> {
    pub input: &'a Path,
    pub offset: Option<usize>,
    pub encoding: Option<Encoding>,
    pub stride: Option<usize>,
    pub rows: Option<usize>,
    pub order: Option<Order>,
    pub big_endian: bool,
    pub profile: Option<&'a Path>,
    pub charger: Option<(i64, i64)>,
    pub scale: Option<u32>,
    pub transform: Option<Transform>,
    pub diagnostic: bool,
    pub output: Option<&'a Path>,
}

impl Options<'_> {
    fn candidate(&self, decode: &DecodeProfile) -> Result<Candidate> {
        let Some(stride) = self.stride.or_else(|| decode.strides.first().copied()) else {
            bail!("No stride given: pass --stride or set decode.strides in a profile");
        };
        let offset = self
            .offset
            .or_else(|| decode.offsets.first().copied())
            .or_else(|| decode.offset_range.map(|range| range.start))
            .unwrap_or(0);
        let encoding = self
            .encoding
            .or_else(|| decode.encodings.first().copied())
            .unwrap_or(Encoding::U8);
        let order = self
            .order
            .or_else(|| decode.orders.first().copied())
            .unwrap_or_default();
        let byte_order = if self.big_endian {
            ByteOrder::Big
        } else {
            decode.byte_order
        };

        let mut candidate = Candidate::new(offset, encoding, stride)
            .with_order(order)
            .with_byte_order(byte_order);
        if let Some(rows) = self.rows.or(decode.rows) {
            candidate = candidate.with_rows(rows);
        }
        Ok(candidate)
    }
}

/// Handle the render command
pub fn handle(opts: &Options<'_>) -> Result<()> {
    let config = Config::load()?;
    let written = run(opts, &config)?;

    println!("PNG:    {}", written.png_path.display());
    println!("Base64: {}", written.base64_path.display());
    Ok(())
}

pub fn run(opts: &Options<'_>, config: &Config) -> Result<Exported> {
    let profile = load_profile(opts.profile, config)?;
    let buffer = vacmap::load(opts.input)
        .with_context(|| format!("Failed to load {}", opts.input.display()))?;

    let candidate = opts.candidate(&profile.decode)?;
    tracing::debug!("Rendering {}", candidate);
    let grid = vacmap::decode(&buffer, &candidate)
        .with_context(|| format!("Cannot decode {} with {}", opts.input.display(), candidate))?;
    tracing::info!(
        "Decoded {}x{} grid, {} distinct values",
        grid.rows(),
        grid.cols(),
        grid.distinct_values()
    );

    let mut options = profile.render.options();
    if let Some(scale) = opts.scale {
        options.scale = scale.max(1);
    }
    if let Some(transform) = opts.transform {
        options.transform = transform;
    }

    let rendered = if opts.diagnostic {
        vacmap::render_diagnostic(&grid, &options)
    } else {
        let table = profile
            .classify
            .table()
            .map_err(anyhow::Error::msg)
            .context("Invalid value table")?;
        let cells = vacmap::classify(&grid, &table);
        for (category, count) in cells.summary() {
            tracing::debug!("{:?}: {} cells", category, count);
        }

        let mut scene = Scene::new(&cells);
        scene.charger = opts.charger;
        vacmap::render(&scene, &profile.render.palette, &options)
    };
    let image = rendered.context("Failed to render map")?;

    let output: PathBuf = opts
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_path(DEFAULT_OUTPUT));

    vacmap::export(&image, &output)
        .with_context(|| format!("Failed to export {}", output.display()))
}
