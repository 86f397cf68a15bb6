//! Raw value classification
//!
//! Values are matched against an ordered table of inclusive ranges. The first
//! matching rule wins and anything no rule covers is `Unknown`, so
//! classification never fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::grid::PixelGrid;

/// Category a rule assigns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Free,
    Wall,
    #[serde(alias = "forbidden-zone", alias = "forbidden_zone")]
    Forbidden,
    Charger,
    Unknown,
    /// Room segment; the raw value becomes the room id
    Room,
}

/// Meaning of a single decoded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticCell {
    Free,
    Wall,
    ForbiddenZone,
    Charger,
    Unknown,
    Room(i64),
}

impl SemanticCell {
    pub fn category(self) -> Category {
        match self {
            SemanticCell::Free => Category::Free,
            SemanticCell::Wall => Category::Wall,
            SemanticCell::ForbiddenZone => Category::Forbidden,
            SemanticCell::Charger => Category::Charger,
            SemanticCell::Unknown => Category::Unknown,
            SemanticCell::Room(_) => Category::Room,
        }
    }
}

impl fmt::Display for SemanticCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticCell::Free => f.write_str("free"),
            SemanticCell::Wall => f.write_str("wall"),
            SemanticCell::ForbiddenZone => f.write_str("forbidden"),
            SemanticCell::Charger => f.write_str("charger"),
            SemanticCell::Unknown => f.write_str("unknown"),
            SemanticCell::Room(id) => write!(f, "room {}", id),
        }
    }
}

/// Inclusive value range mapped to a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub min: i64,
    pub max: i64,
    pub category: Category,
}

impl Rule {
    pub fn exact(value: i64, category: Category) -> Self {
        Self {
            min: value,
            max: value,
            category,
        }
    }

    pub fn range(min: i64, max: i64, category: Category) -> Self {
        Self { min, max, category }
    }

    pub fn matches(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Ordered value → category table for one device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTable {
    pub rules: Vec<Rule>,
}

impl ValueTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Occupancy layout seen on Tuya-based vacuums: 0 free, 0x7F unexplored,
    /// every other byte an obstacle
    pub fn occupancy() -> Self {
        Self::new(vec![
            Rule::exact(0, Category::Free),
            Rule::exact(127, Category::Unknown),
            Rule::range(1, 126, Category::Wall),
            Rule::range(128, 255, Category::Wall),
        ])
    }

    /// Segment map layout: 0 background, 1-254 room ids, 255 wall
    pub fn segments() -> Self {
        Self::new(vec![
            Rule::exact(0, Category::Free),
            Rule::range(1, 254, Category::Room),
            Rule::exact(255, Category::Wall),
        ])
    }

    /// Look up a built-in table by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "occupancy" => Some(Self::occupancy()),
            "segments" => Some(Self::segments()),
            _ => None,
        }
    }

    pub const PRESETS: &'static [&'static str] = &["occupancy", "segments"];

    pub fn lookup(&self, value: i64) -> SemanticCell {
        let Some(rule) = self.rules.iter().find(|r| r.matches(value)) else {
            return SemanticCell::Unknown;
        };

        match rule.category {
            Category::Free => SemanticCell::Free,
            Category::Wall => SemanticCell::Wall,
            Category::Forbidden => SemanticCell::ForbiddenZone,
            Category::Charger => SemanticCell::Charger,
            Category::Unknown => SemanticCell::Unknown,
            Category::Room => SemanticCell::Room(value),
        }
    }
}

/// Classified grid, same shape as the source `PixelGrid`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<SemanticCell>,
}

impl CellGrid {
    /// Build a grid from row-major cells. Returns `None` on a shape mismatch.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<SemanticCell>) -> Option<Self> {
        if rows.checked_mul(cols)? != cells.len() {
            return None;
        }
        Some(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<SemanticCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub fn cells(&self) -> &[SemanticCell] {
        &self.cells
    }

    /// Cell count per category
    pub fn summary(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for cell in &self.cells {
            *counts.entry(cell.category()).or_insert(0) += 1;
        }
        counts
    }

    /// Color free cells by room using a segment layer of the same shape.
    ///
    /// A cell becomes `Room(id)` only where this grid is `Free` and the
    /// segment layer holds `Room(id)`. Returns `None` on a shape mismatch.
    pub fn overlay_rooms(&self, segments: &CellGrid) -> Option<CellGrid> {
        if (self.rows, self.cols) != (segments.rows, segments.cols) {
            return None;
        }

        let cells = self
            .cells
            .iter()
            .zip(&segments.cells)
            .map(|(&cell, &segment)| match (cell, segment) {
                (SemanticCell::Free, SemanticCell::Room(id)) => SemanticCell::Room(id),
                _ => cell,
            })
            .collect();

        Some(Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        })
    }

    /// Distinct room ids in ascending order
    pub fn room_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .cells
            .iter()
            .filter_map(|c| match c {
                SemanticCell::Room(id) => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Classify every cell of a grid
pub fn classify(grid: &PixelGrid, table: &ValueTable) -> CellGrid {
    CellGrid {
        rows: grid.rows(),
        cols: grid.cols(),
        cells: grid.values().iter().map(|&v| table.lookup(v)).collect(),
    }
}
