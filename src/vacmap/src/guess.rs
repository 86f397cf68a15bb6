//! Brute-force layout guessing
//!
//! Each candidate is applied to the dump independently. Candidates that cannot
//! describe the dump are rejected and skipped; there is no scoring, so every
//! viable grid is handed back for visual comparison.

use std::fmt;

use crate::buffer::RawMapBuffer;
use crate::candidate::{Candidate, Order};
use crate::grid::PixelGrid;

/// Why a candidate could not be applied to a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("stride must be at least one cell")]
    ZeroStride,

    #[error("header offset {offset} is past the end of a {len}-byte buffer")]
    OffsetBeyondEnd { offset: usize, len: usize },

    #[error("{tail} bytes after the header leave {remainder} over for {row_bytes}-byte rows")]
    Indivisible {
        tail: usize,
        row_bytes: usize,
        remainder: usize,
    },

    #[error("need {needed} bytes after the header, only {available} available")]
    TooShort { needed: usize, available: usize },

    #[error("no cells after the header")]
    Empty,
}

/// Apply one candidate to a dump
pub fn decode(buffer: &RawMapBuffer, candidate: &Candidate) -> Result<PixelGrid, Rejection> {
    let bytes = buffer.bytes();

    if candidate.stride == 0 {
        return Err(Rejection::ZeroStride);
    }
    if candidate.offset > bytes.len() {
        return Err(Rejection::OffsetBeyondEnd {
            offset: candidate.offset,
            len: bytes.len(),
        });
    }

    let tail = bytes.len() - candidate.offset;
    let width = candidate.byte_width();
    let row_bytes = width.saturating_mul(candidate.stride);

    let rows = match candidate.rows {
        Some(rows) => {
            let needed = rows.saturating_mul(row_bytes);
            if needed > tail {
                return Err(Rejection::TooShort {
                    needed,
                    available: tail,
                });
            }
            rows
        }
        None => {
            let remainder = tail % row_bytes;
            if remainder != 0 {
                return Err(Rejection::Indivisible {
                    tail,
                    row_bytes,
                    remainder,
                });
            }
            tail / row_bytes
        }
    };

    if rows == 0 {
        return Err(Rejection::Empty);
    }

    let cols = candidate.stride;
    let used = &bytes[candidate.offset..candidate.offset + rows * row_bytes];
    let cells = used
        .chunks_exact(width)
        .map(|chunk| candidate.encoding.read(chunk, candidate.byte_order));

    let values: Vec<i64> = match candidate.order {
        Order::RowMajor => cells.collect(),
        Order::ColumnMajor => {
            let mut values = vec![0i64; rows * cols];
            for (k, v) in cells.enumerate() {
                let (row, col) = (k % rows, k / rows);
                values[row * cols + col] = v;
            }
            values
        }
    };

    PixelGrid::from_values(rows, cols, values).ok_or(Rejection::Empty)
}

/// Filters applied to viable grids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessFilter {
    /// Drop grids where every cell holds the same value
    pub skip_uniform: bool,
}

/// A candidate that produced a grid
#[derive(Debug, Clone)]
pub struct Decoded {
    pub candidate: Candidate,
    pub grid: PixelGrid,
}

/// Outcome of trying a set of candidates
#[derive(Debug, Clone, Default)]
pub struct GuessReport {
    /// Viable grids in candidate order
    pub decoded: Vec<Decoded>,
    /// Candidates that could not be applied
    pub rejected: Vec<(Candidate, Rejection)>,
    /// Candidates that decoded to a uniform grid and were filtered out
    pub uniform: Vec<Candidate>,
}

impl GuessReport {
    pub fn attempted(&self) -> usize {
        self.decoded.len() + self.rejected.len() + self.uniform.len()
    }
}

impl fmt::Display for GuessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates: {} viable, {} rejected, {} uniform",
            self.attempted(),
            self.decoded.len(),
            self.rejected.len(),
            self.uniform.len()
        )
    }
}

/// Try every candidate against the dump
pub fn guess<'a, I>(buffer: &RawMapBuffer, candidates: I, filter: GuessFilter) -> GuessReport
where
    I: IntoIterator<Item = &'a Candidate>,
{
    let mut report = GuessReport::default();

    for candidate in candidates {
        match decode(buffer, candidate) {
            Ok(grid) if filter.skip_uniform && grid.is_uniform() => {
                tracing::debug!("Skipping {}: uniform grid", candidate);
                report.uniform.push(*candidate);
            }
            Ok(grid) => {
                tracing::debug!(
                    "Viable {}: {}x{} grid, {} distinct values",
                    candidate,
                    grid.rows(),
                    grid.cols(),
                    grid.distinct_values()
                );
                report.decoded.push(Decoded {
                    candidate: *candidate,
                    grid,
                });
            }
            Err(rejection) => {
                tracing::debug!("Rejected {}: {}", candidate, rejection);
                report.rejected.push((*candidate, rejection));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{ByteOrder, CandidateSpace, Encoding};

    fn buffer(len: usize) -> RawMapBuffer {
        RawMapBuffer::from_bytes((0..len).map(|i| i as u8).collect::<Vec<_>>())
    }

    #[test]
    fn test_divisible_candidate_decodes() {
        let grid = decode(&buffer(100), &Candidate::new(4, Encoding::U8, 8)).unwrap();
        assert_eq!(grid.shape(), (12, 8));
        assert_eq!(grid.get(0, 0), Some(4));
        assert_eq!(grid.get(11, 7), Some(99));
    }

    #[test]
    fn test_indivisible_candidate_rejected() {
        let err = decode(&buffer(100), &Candidate::new(4, Encoding::U8, 7)).unwrap_err();
        assert_eq!(
            err,
            Rejection::Indivisible {
                tail: 96,
                row_bytes: 7,
                remainder: 5
            }
        );
    }

    #[test]
    fn test_shape_formula_holds_for_wide_cells() {
        let buf = buffer(100);
        for (offset, encoding, stride) in [
            (0, Encoding::U8, 10),
            (4, Encoding::U16, 4),
            (4, Encoding::U32, 6),
            (20, Encoding::I16, 8),
            (36, Encoding::F32, 16),
        ] {
            let candidate = Candidate::new(offset, encoding, stride);
            let grid = decode(&buf, &candidate).unwrap();
            let expected_rows = (100 - offset) / (encoding.byte_width() * stride);
            assert_eq!(grid.shape(), (expected_rows, stride), "{}", candidate);
        }
    }

    #[test]
    fn test_zero_stride_rejected() {
        let err = decode(&buffer(16), &Candidate::new(0, Encoding::U8, 0)).unwrap_err();
        assert_eq!(err, Rejection::ZeroStride);
    }

    #[test]
    fn test_offset_past_end_rejected() {
        let err = decode(&buffer(16), &Candidate::new(17, Encoding::U8, 1)).unwrap_err();
        assert_eq!(err, Rejection::OffsetBeyondEnd { offset: 17, len: 16 });
    }

    #[test]
    fn test_offset_at_end_is_empty() {
        let err = decode(&buffer(16), &Candidate::new(16, Encoding::U8, 4)).unwrap_err();
        assert_eq!(err, Rejection::Empty);
    }

    #[test]
    fn test_window_mode_ignores_trailing_bytes() {
        let candidate = Candidate::new(4, Encoding::U8, 7).with_rows(3);
        let grid = decode(&buffer(100), &candidate).unwrap();
        assert_eq!(grid.shape(), (3, 7));
        assert_eq!(grid.get(2, 6), Some(24));
    }

    #[test]
    fn test_window_mode_too_short() {
        let candidate = Candidate::new(0, Encoding::U16, 10).with_rows(6);
        let err = decode(&buffer(100), &candidate).unwrap_err();
        assert_eq!(
            err,
            Rejection::TooShort {
                needed: 120,
                available: 100
            }
        );
    }

    #[test]
    fn test_column_major_fill() {
        let buf = RawMapBuffer::from_bytes(vec![1, 2, 3, 4, 5, 6]);
        let candidate = Candidate::new(0, Encoding::U8, 3).with_order(Order::ColumnMajor);
        let grid = decode(&buf, &candidate).unwrap();

        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.row(0), Some(&[1, 3, 5][..]));
        assert_eq!(grid.row(1), Some(&[2, 4, 6][..]));
    }

    #[test]
    fn test_big_endian_cells() {
        let buf = RawMapBuffer::from_bytes(vec![0x01, 0x02, 0x00, 0xff]);
        let candidate = Candidate::new(0, Encoding::U16, 2).with_byte_order(ByteOrder::Big);
        let grid = decode(&buf, &candidate).unwrap();
        assert_eq!(grid.values(), &[258, 255]);
    }

    #[test]
    fn test_guess_skips_rejections() {
        let space = CandidateSpace {
            offsets: vec![4],
            encodings: vec![Encoding::U8],
            strides: vec![7, 8, 12],
            ..CandidateSpace::default()
        };
        let candidates = space.candidates();
        let report = guess(&buffer(100), &candidates, GuessFilter::default());

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.decoded.len(), 2);
        assert_eq!(report.decoded[0].candidate.stride, 8);
        assert_eq!(report.decoded[1].candidate.stride, 12);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0.stride, 7);
    }

    #[test]
    fn test_guess_uniform_filter() {
        let buf = RawMapBuffer::from_bytes(vec![0x7f; 64]);
        let candidates = [Candidate::new(0, Encoding::U8, 8)];

        let kept = guess(&buf, &candidates, GuessFilter::default());
        assert_eq!(kept.decoded.len(), 1);

        let filtered = guess(&buf, &candidates, GuessFilter { skip_uniform: true });
        assert!(filtered.decoded.is_empty());
        assert_eq!(filtered.uniform, vec![candidates[0]]);
        assert_eq!(filtered.to_string(), "1 candidates: 0 viable, 0 rejected, 1 uniform");
    }
}
