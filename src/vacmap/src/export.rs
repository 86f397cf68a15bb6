//! PNG and base64 output

use base64::prelude::*;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Files written by [`export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub png_path: PathBuf,
    pub base64_path: PathBuf,
    /// Size of the PNG in bytes
    pub png_len: usize,
}

/// Encode an image as PNG in memory
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(png)
}

/// Companion text path: `map.png` becomes `map.base64.txt`, anything else
/// gets `.base64.txt` appended.
pub fn base64_path_for(png_path: &Path) -> PathBuf {
    let is_png = png_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    if is_png {
        png_path.with_extension("base64.txt")
    } else {
        let mut name = png_path.as_os_str().to_os_string();
        name.push(".base64.txt");
        PathBuf::from(name)
    }
}

/// `data:image/png;base64,...` URI for embedding in HTML or dashboards
pub fn data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png))
}

/// Write `path` as PNG and a base64 text file of the same bytes next to it.
///
/// The base64 text decodes to exactly the bytes of the PNG file.
pub fn export(image: &RgbaImage, path: impl AsRef<Path>) -> Result<Exported> {
    let png_path = path.as_ref().to_path_buf();
    let base64_path = base64_path_for(&png_path);

    let png = encode_png(image)?;

    if let Some(parent) = png_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&png_path, &png).map_err(|source| Error::Write {
        path: png_path.clone(),
        source,
    })?;
    // Encode what actually landed on disk
    let written = fs::read(&png_path).map_err(|source| Error::Read {
        path: png_path.clone(),
        source,
    })?;
    fs::write(&base64_path, BASE64_STANDARD.encode(&written)).map_err(|source| Error::Write {
        path: base64_path.clone(),
        source,
    })?;

    tracing::info!(
        "Wrote {} ({} bytes) and {}",
        png_path.display(),
        written.len(),
        base64_path.display()
    );

    Ok(Exported {
        png_path,
        base64_path,
        png_len: written.len(),
    })
}
