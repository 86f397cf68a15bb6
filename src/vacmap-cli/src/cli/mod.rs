//! CLI argument definitions for vacmap
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod layout;

pub use core::{Cli, Commands};
pub use layout::LayoutArgs;
