//! Decoded pixel grids

use std::collections::BTreeMap;

/// A rows x cols grid of raw cell values, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: usize,
    cols: usize,
    values: Vec<i64>,
}

impl PixelGrid {
    /// Build a grid from row-major values. Returns `None` if the value count
    /// does not match `rows * cols`.
    pub fn from_values(rows: usize, cols: usize, values: Vec<i64>) -> Option<Self> {
        if rows.checked_mul(cols)? != values.len() {
            return None;
        }
        Some(Self { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.values[row * self.cols + col])
    }

    /// Row-major view of all values
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn row(&self, row: usize) -> Option<&[i64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.values[start..start + self.cols])
    }

    /// Count of each distinct value, sorted by value
    pub fn histogram(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for &v in &self.values {
            *counts.entry(v).or_insert(0) += 1;
        }
        counts
    }

    pub fn distinct_values(&self) -> usize {
        self.histogram().len()
    }

    /// True when every cell holds the same value (or the grid is empty)
    pub fn is_uniform(&self) -> bool {
        match self.values.first() {
            Some(&first) => self.values.iter().all(|&v| v == first),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelGrid {
        PixelGrid::from_values(2, 3, vec![0, 1, 2, 0, 0, 127]).unwrap()
    }

    #[test]
    fn test_from_values_checks_shape() {
        assert!(PixelGrid::from_values(2, 2, vec![0; 3]).is_none());
        assert!(PixelGrid::from_values(usize::MAX, 2, vec![]).is_none());
        assert!(PixelGrid::from_values(0, 5, vec![]).is_some());
    }

    #[test]
    fn test_get_and_row() {
        let grid = sample();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.get(0, 2), Some(2));
        assert_eq!(grid.get(1, 2), Some(127));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.row(1), Some(&[0, 0, 127][..]));
        assert_eq!(grid.row(2), None);
    }

    #[test]
    fn test_histogram() {
        let grid = sample();
        let histogram = grid.histogram();
        assert_eq!(histogram.get(&0), Some(&3));
        assert_eq!(histogram.get(&127), Some(&1));
        assert_eq!(grid.distinct_values(), 4);
    }

    #[test]
    fn test_is_uniform() {
        assert!(!sample().is_uniform());
        assert!(PixelGrid::from_values(2, 2, vec![0x7f; 4]).unwrap().is_uniform());
    }
}
