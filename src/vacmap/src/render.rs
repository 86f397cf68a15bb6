//! Rasterizing classified grids
//!
//! Each cell becomes a `scale` x `scale` block of its category color. Zone
//! polygons and the charger marker are blended on top, then the optional
//! orientation transform is applied to the finished image.

use image::{imageops, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut, Blend,
};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::classify::CellGrid;
use crate::grid::PixelGrid;
use crate::palette::{spread_color, Color, Palette};
use crate::{Error, Result};

/// Orientation fix applied after drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    #[default]
    None,
    FlipHorizontal,
    FlipVertical,
    #[serde(rename = "rotate-180")]
    Rotate180,
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Transform::None),
            "flip-horizontal" | "mirror" => Ok(Transform::FlipHorizontal),
            "flip-vertical" => Ok(Transform::FlipVertical),
            "rotate-180" | "rotate180" => Ok(Transform::Rotate180),
            other => Err(format!("unknown transform '{}'", other)),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transform::None => "none",
            Transform::FlipHorizontal => "flip-horizontal",
            Transform::FlipVertical => "flip-vertical",
            Transform::Rotate180 => "rotate-180",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output pixels per cell edge
    pub scale: u32,
    /// Charger marker radius in cells
    pub marker_radius: u32,
    pub transform: Transform,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            marker_radius: 3,
            transform: Transform::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    NoGo,
    NoMop,
    Room,
}

/// Polygon overlay in cell coordinates (column, row)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub kind: ZoneKind,
    pub vertices: Vec<(i64, i64)>,
}

impl Zone {
    pub fn new(kind: ZoneKind, vertices: Vec<(i64, i64)>) -> Self {
        Self { kind, vertices }
    }
}

/// Everything drawn into one image
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub cells: &'a CellGrid,
    /// Charger cell (column, row)
    pub charger: Option<(i64, i64)>,
    pub zones: Vec<Zone>,
}

impl<'a> Scene<'a> {
    pub fn new(cells: &'a CellGrid) -> Self {
        Self {
            cells,
            charger: None,
            zones: Vec::new(),
        }
    }

    pub fn with_charger(mut self, x: i64, y: i64) -> Self {
        self.charger = Some((x, y));
        self
    }

    pub fn with_zones(mut self, zones: Vec<Zone>) -> Self {
        self.zones = zones;
        self
    }
}

/// Largest image `render` will allocate, in pixels (1 GiB of RGBA)
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Render a scene. Identical inputs always give identical pixels.
pub fn render(scene: &Scene<'_>, palette: &Palette, options: &RenderOptions) -> Result<RgbaImage> {
    let scale = options.scale.max(1);
    let cells = scene.cells;

    let mut image = paint_cells(cells.rows(), cells.cols(), scale, |i| {
        palette.color_of(cells.cells()[i])
    })?;

    if image.width() > 0 && image.height() > 0 {
        let mut canvas = Blend(image);
        for zone in &scene.zones {
            draw_zone(&mut canvas, zone, palette, scale);
        }
        if let Some((x, y)) = scene.charger {
            draw_charger(&mut canvas, cells, (x, y), palette, scale, options.marker_radius);
        }
        image = canvas.0;
    }

    Ok(apply_transform(image, options.transform))
}

/// Render raw values without a value table: each distinct value gets its own
/// color, ordered by value. Used to compare candidate layouts by eye.
pub fn render_diagnostic(grid: &PixelGrid, options: &RenderOptions) -> Result<RgbaImage> {
    let histogram = grid.histogram();
    let count = histogram.len();
    let colors: HashMap<i64, Color> = histogram
        .keys()
        .enumerate()
        .map(|(rank, &value)| (value, spread_color(rank, count)))
        .collect();

    let image = paint_cells(grid.rows(), grid.cols(), options.scale.max(1), |i| {
        colors[&grid.values()[i]]
    })?;
    Ok(apply_transform(image, options.transform))
}

fn paint_cells<F>(rows: usize, cols: usize, scale: u32, color_at: F) -> Result<RgbaImage>
where
    F: Fn(usize) -> Color,
{
    let (width, height) = image_size(rows, cols, scale)?;
    let mut image = RgbaImage::new(width, height);

    for row in 0..rows {
        for col in 0..cols {
            let pixel = color_at(row * cols + col).to_rgba();
            let (x0, y0) = (col as u32 * scale, row as u32 * scale);
            for dy in 0..scale {
                for dx in 0..scale {
                    image.put_pixel(x0 + dx, y0 + dy, pixel);
                }
            }
        }
    }

    Ok(image)
}

/// Output dimensions for a grid, refusing anything over `MAX_IMAGE_PIXELS`
fn image_size(rows: usize, cols: usize, scale: u32) -> Result<(u32, u32)> {
    let width = (cols as u64).checked_mul(scale as u64);
    let height = (rows as u64).checked_mul(scale as u64);
    let too_large = || Error::ImageTooLarge {
        width: width.unwrap_or(u64::MAX),
        height: height.unwrap_or(u64::MAX),
    };

    let (Some(width), Some(height)) = (width, height) else {
        return Err(too_large());
    };
    let pixels = width.checked_mul(height).ok_or_else(too_large)?;
    if pixels > MAX_IMAGE_PIXELS || width > u32::MAX as u64 || height > u32::MAX as u64 {
        return Err(too_large());
    }

    Ok((width as u32, height as u32))
}

/// Center of a cell in output pixels
fn cell_center(x: i64, y: i64, scale: u32) -> (i32, i32) {
    let (px, py) = cell_center_f64(x, y, scale);
    (
        px.clamp(i32::MIN as f64, i32::MAX as f64) as i32,
        py.clamp(i32::MIN as f64, i32::MAX as f64) as i32,
    )
}

fn cell_center_f64(x: i64, y: i64, scale: u32) -> (f64, f64) {
    let scale = scale as f64;
    let half = (scale / 2.0).floor();
    (x as f64 * scale + half, y as f64 * scale + half)
}

fn draw_zone(canvas: &mut Blend<RgbaImage>, zone: &Zone, palette: &Palette, scale: u32) {
    let distinct: BTreeSet<(i64, i64)> = zone.vertices.iter().copied().collect();
    if distinct.len() < 3 {
        tracing::debug!(
            "Skipping {:?} zone with {} distinct vertices",
            zone.kind,
            distinct.len()
        );
        return;
    }

    let (width, height) = canvas.0.dimensions();
    let projected: Vec<(f64, f64)> = zone
        .vertices
        .iter()
        .map(|&(x, y)| cell_center_f64(x, y, scale))
        .collect();
    let clipped = clip_to_canvas(&projected, width, height);

    let mut points: Vec<Point<i32>> = Vec::with_capacity(clipped.len());
    for (x, y) in clipped {
        let point = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        tracing::debug!("{:?} zone lies outside the image", zone.kind);
        return;
    }

    let (fill, outline) = match zone.kind {
        ZoneKind::NoGo => (Some(palette.no_go_fill), palette.no_go_outline),
        ZoneKind::NoMop => (Some(palette.no_mop_fill), palette.no_mop_outline),
        ZoneKind::Room => (None, palette.room_outline),
    };

    if let Some(fill) = fill {
        draw_polygon_mut(canvas, &points, fill.to_rgba());
    }

    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            canvas,
            (start.x as f32, start.y as f32),
            (end.x as f32, end.y as f32),
            outline.to_rgba(),
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Clip a polygon to one pixel beyond each image edge (Sutherland-Hodgman).
/// Edges introduced by the clip run outside the image and never show.
fn clip_to_canvas(points: &[(f64, f64)], width: u32, height: u32) -> Vec<(f64, f64)> {
    let mut clipped = clip_against(points, Axis::X, -1.0, false);
    clipped = clip_against(&clipped, Axis::X, width as f64, true);
    clipped = clip_against(&clipped, Axis::Y, -1.0, false);
    clip_against(&clipped, Axis::Y, height as f64, true)
}

fn clip_against(
    points: &[(f64, f64)],
    axis: Axis,
    bound: f64,
    keep_below: bool,
) -> Vec<(f64, f64)> {
    let coord = |(x, y): (f64, f64)| match axis {
        Axis::X => x,
        Axis::Y => y,
    };
    let inside = |p: (f64, f64)| {
        if keep_below {
            coord(p) <= bound
        } else {
            coord(p) >= bound
        }
    };
    // Interpolate from the inside end to keep precision near the image
    let crossing = |from: (f64, f64), to: (f64, f64)| {
        let t = (bound - coord(from)) / (coord(to) - coord(from));
        match axis {
            Axis::X => (bound, from.1 + t * (to.1 - from.1)),
            Axis::Y => (from.0 + t * (to.0 - from.0), bound),
        }
    };

    let mut out = Vec::with_capacity(points.len() + 4);
    for (i, &current) in points.iter().enumerate() {
        let previous = points[(i + points.len() - 1) % points.len()];
        match (inside(previous), inside(current)) {
            (true, true) => out.push(current),
            (true, false) => out.push(crossing(previous, current)),
            (false, true) => {
                out.push(crossing(current, previous));
                out.push(current);
            }
            (false, false) => {}
        }
    }
    out
}

fn draw_charger(
    canvas: &mut Blend<RgbaImage>,
    cells: &CellGrid,
    (x, y): (i64, i64),
    palette: &Palette,
    scale: u32,
    marker_radius: u32,
) {
    let in_bounds = x >= 0 && y >= 0 && (x as usize) < cells.cols() && (y as usize) < cells.rows();
    if !in_bounds {
        tracing::debug!(
            "Charger at ({}, {}) is outside the {}x{} grid, not drawn",
            x,
            y,
            cells.cols(),
            cells.rows()
        );
        return;
    }

    let center = cell_center(x, y, scale);
    let radius = (marker_radius.saturating_mul(scale)).max(1) as i32;
    let ring = radius + (scale as i32).max(1);

    draw_filled_circle_mut(canvas, center, radius, palette.charger.to_rgba());
    draw_hollow_circle_mut(canvas, center, ring, palette.charger_ring.to_rgba());
}

fn apply_transform(image: RgbaImage, transform: Transform) -> RgbaImage {
    match transform {
        Transform::None => image,
        Transform::FlipHorizontal => imageops::flip_horizontal(&image),
        Transform::FlipVertical => imageops::flip_vertical(&image),
        Transform::Rotate180 => imageops::rotate180(&image),
    }
}
