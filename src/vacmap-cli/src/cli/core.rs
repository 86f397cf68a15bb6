//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vacmap::{Encoding, Order, Transform};

use super::layout::{parse_cell, LayoutArgs};

#[derive(Parser)]
#[command(name = "vacmap")]
#[command(about = "Robot vacuum map dump decoder", long_about = None)]
pub struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show size, fingerprint, hex preview and byte histogram of a dump
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to the map dump
        input: PathBuf,

        /// Number of leading bytes to hex dump
        #[arg(short, long, default_value_t = 64)]
        bytes: usize,

        /// Number of most frequent byte values to list
        #[arg(long, default_value_t = 8)]
        top: usize,
    },

    /// Try candidate layouts and write a diagnostic image for each viable one
    #[command(visible_alias = "g")]
    Guess {
        /// Path to the map dump
        input: PathBuf,

        /// Device profile (TOML or YAML)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Keep grids where every cell holds the same value
        #[arg(long)]
        keep_uniform: bool,

        /// Output pixels per cell
        #[arg(long)]
        scale: Option<u32>,

        /// Directory for diagnostic images
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the candidate table as JSON
        #[arg(long)]
        json: bool,

        /// Only print the table, write no images
        #[arg(long)]
        no_images: bool,
    },

    /// Decode one candidate, classify, render and export PNG + base64
    #[command(visible_alias = "r")]
    Render {
        /// Path to the map dump
        input: PathBuf,

        /// Row stride in cells [default: first profile stride]
        #[arg(long)]
        stride: Option<usize>,

        /// Header offset in bytes [default: first profile offset, else 0]
        #[arg(long)]
        offset: Option<usize>,

        /// Cell encoding [default: first profile encoding, else u8]
        #[arg(long)]
        encoding: Option<Encoding>,

        /// Fixed row count (trailing bytes are ignored)
        #[arg(long)]
        rows: Option<usize>,

        /// Reshape order [default: first profile order, else row-major]
        #[arg(long)]
        order: Option<Order>,

        /// Multi-byte cells are big-endian (otherwise the profile decides)
        #[arg(long)]
        big_endian: bool,

        /// Device profile (TOML or YAML)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Charger cell as COLUMN,ROW
        #[arg(long, value_parser = parse_cell, allow_hyphen_values = true)]
        charger: Option<(i64, i64)>,

        /// Output pixels per cell (overrides the profile)
        #[arg(long)]
        scale: Option<u32>,

        /// Orientation fix: none, flip-horizontal, flip-vertical, rotate-180
        #[arg(long)]
        transform: Option<Transform>,

        /// Color raw values directly instead of classifying them
        #[arg(long)]
        diagnostic: bool,

        /// Output PNG path
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },

    /// Convert a map directory with JSON sidecars into a dashboard image
    #[command(visible_alias = "c")]
    Convert {
        /// Directory holding map_record.map and map_record.json
        dir: PathBuf,

        /// Device profile (TOML or YAML)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Header offset in bytes
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Segment map coloring free cells by room [default: map.segmentmap in DIR]
        #[arg(long)]
        segments: Option<PathBuf>,

        /// Header offset of the segment map [default: --offset]
        #[arg(long)]
        segment_offset: Option<usize>,

        /// Output pixels per cell (overrides the profile)
        #[arg(long)]
        scale: Option<u32>,

        /// Orientation fix (overrides the profile)
        #[arg(long)]
        transform: Option<Transform>,

        /// Leave out no-go, no-mop and room outlines
        #[arg(long)]
        no_zones: bool,

        /// Output PNG path
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },

    /// Configure default settings
    #[command(visible_alias = "cfg")]
    Configure {
        /// Set the default device profile
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Set the default output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
