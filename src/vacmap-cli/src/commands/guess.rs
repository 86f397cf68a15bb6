//! Candidate layout guessing
//!
//! Every viable candidate gets a diagnostic image so the right layout can be
//! picked by eye.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use vacmap::metadata::RECORD_FILE;
use vacmap::{Candidate, GuessFilter, GuessReport};

use super::{load_profile, sibling_record, stem_of};
use crate::cli::LayoutArgs;
use crate::config::Config;

/// Default directory for diagnostic images
const DEFAULT_OUT_DIR: &str = "guesses";

pub struct Options<'a> {
    pub input: &'a Path,
    pub profile: Option<&'a Path>,
    pub layout: &'a LayoutArgs,
    pub keep_uniform: bool,
    pub scale: Option<u32>,
    pub out_dir: Option<&'a Path>,
    pub json: bool,
    pub no_images: bool,
}

/// One viable candidate in the output table
#[derive(Debug, Serialize)]
pub struct GuessRow {
    pub label: String,
    #[serde(flatten)]
    pub candidate: Candidate,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub distinct_values: usize,
    pub image: Option<PathBuf>,
}

/// Handle the guess command
pub fn handle(opts: &Options<'_>) -> Result<()> {
    let config = Config::load()?;
    let (report, rows) = run(opts, &config)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        tracing::info!("{}", report);
        return Ok(());
    }

    print_table(&rows);
    println!();
    println!("{}", report);
    if let Some(dir) = rows.iter().find_map(|r| r.image.as_deref()?.parent()) {
        println!("Diagnostic images in {}", dir.display());
    }

    Ok(())
}

/// Decode every candidate and write diagnostic images
pub fn run(opts: &Options<'_>, config: &Config) -> Result<(GuessReport, Vec<GuessRow>)> {
    let profile = load_profile(opts.profile, config)?;
    let buffer = vacmap::load(opts.input)
        .with_context(|| format!("Failed to load {}", opts.input.display()))?;

    let mut space = opts.layout.apply(profile.decode.space());
    if space.strides.is_empty() {
        let Some(record) = sibling_record(opts.input)? else {
            bail!(
                "No strides to try: pass --stride, set decode.strides in a profile, \
                 or put {} next to the dump",
                RECORD_FILE
            );
        };
        tracing::info!(
            "Using {}x{} from {}",
            record.width,
            record.height,
            RECORD_FILE
        );
        space.strides = vec![record.width];
        space.rows = space.rows.or(Some(record.height));
    }

    let filter = GuessFilter {
        skip_uniform: profile.decode.skip_uniform && !opts.keep_uniform,
    };
    let candidates = space.candidates();
    tracing::debug!("Trying {} candidates", candidates.len());
    let report = vacmap::guess(&buffer, &candidates, filter);

    let out_dir = opts
        .out_dir
        .map(Path::to_path_buf)
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    let mut options = profile.render.options();
    if let Some(scale) = opts.scale {
        options.scale = scale.max(1);
    }
    let stem = stem_of(opts.input);

    if !opts.no_images && !report.decoded.is_empty() {
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }

    let mut rows = Vec::with_capacity(report.decoded.len());
    for decoded in &report.decoded {
        let label = decoded.candidate.label();

        let image = if opts.no_images {
            None
        } else {
            let path = out_dir.join(format!("{}_{}.png", stem, label));
            let rendered = vacmap::render_diagnostic(&decoded.grid, &options)
                .with_context(|| format!("Failed to render {}", label))?;
            let png = vacmap::encode_png(&rendered)?;
            fs::write(&path, png)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(path)
        };

        rows.push(GuessRow {
            label,
            candidate: decoded.candidate,
            grid_rows: decoded.grid.rows(),
            grid_cols: decoded.grid.cols(),
            distinct_values: decoded.grid.distinct_values(),
            image,
        });
    }

    Ok((report, rows))
}

fn print_table(rows: &[GuessRow]) {
    if rows.is_empty() {
        println!("No viable candidates.");
        return;
    }

    println!("{:<32} {:>11} {:>9}", "CANDIDATE", "SHAPE", "DISTINCT");
    for row in rows {
        println!(
            "{:<32} {:>11} {:>9}",
            row.label,
            format!("{}x{}", row.grid_rows, row.grid_cols),
            row.distinct_values
        );
    }
}
