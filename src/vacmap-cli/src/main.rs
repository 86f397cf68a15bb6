mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "vacmap=debug" } else { "vacmap=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Inspect { input, bytes, top } => {
            commands::inspect::handle(&input, bytes, top)?;
        }

        Commands::Guess {
            input,
            profile,
            layout,
            keep_uniform,
            scale,
            out_dir,
            json,
            no_images,
        } => {
            commands::guess::handle(&commands::guess::Options {
                input: &input,
                profile: profile.as_deref(),
                layout: &layout,
                keep_uniform,
                scale,
                out_dir: out_dir.as_deref(),
                json,
                no_images,
            })?;
        }

        Commands::Render {
            input,
            stride,
            offset,
            encoding,
            rows,
            order,
            big_endian,
            profile,
            charger,
            scale,
            transform,
            diagnostic,
            output,
        } => {
            commands::render::handle(&commands::render::Options {
                input: &input,
                offset,
                encoding,
                stride,
                rows,
                order,
                big_endian,
                profile: profile.as_deref(),
                charger,
                scale,
                transform,
                diagnostic,
                output: output.as_deref(),
            })?;
        }

        Commands::Convert {
            dir,
            profile,
            offset,
            segments,
            segment_offset,
            scale,
            transform,
            no_zones,
            output,
        } => {
            commands::convert::handle(&commands::convert::Options {
                dir: &dir,
                profile: profile.as_deref(),
                offset,
                segments: segments.as_deref(),
                segment_offset,
                scale,
                transform,
                no_zones,
                output: output.as_deref(),
            })?;
        }

        Commands::Configure {
            profile,
            output_dir,
            show,
        } => {
            commands::configure::handle(profile, output_dir, show)?;
        }
    }

    Ok(())
}
