//! Candidate layout flags shared by subcommands

use clap::Args;
use vacmap::{ByteOrder, CandidateSpace, Encoding, OffsetRange, Order};

/// Candidate parameters. Any list given here replaces the profile's list.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Header offsets in bytes (comma separated or repeated)
    #[arg(long = "offset", value_delimiter = ',')]
    pub offsets: Vec<usize>,

    /// Offset sweep START:END[:STEP], end exclusive, tried after --offset
    #[arg(long)]
    pub offset_range: Option<OffsetRange>,

    /// Cell encodings: u8, i8, u16, i16, u32, i32, f32
    #[arg(long = "encoding", value_delimiter = ',')]
    pub encodings: Vec<Encoding>,

    /// Row strides in cells
    #[arg(long = "stride", value_delimiter = ',')]
    pub strides: Vec<usize>,

    /// Reshape orders: row-major, column-major
    #[arg(long = "order", value_delimiter = ',')]
    pub orders: Vec<Order>,

    /// Fixed row count (trailing bytes are ignored)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Multi-byte cells are big-endian
    #[arg(long)]
    pub big_endian: bool,
}

impl LayoutArgs {
    /// Overlay these flags on a profile's candidate space
    pub fn apply(&self, mut space: CandidateSpace) -> CandidateSpace {
        if !self.offsets.is_empty() {
            space.offsets = self.offsets.clone();
        }
        if let Some(range) = self.offset_range {
            // A sweep on the command line stands in for the profile's offsets
            if self.offsets.is_empty() {
                space.offsets.clear();
            }
            space.offset_range = Some(range);
        }
        if !self.encodings.is_empty() {
            space.encodings = self.encodings.clone();
        }
        if !self.strides.is_empty() {
            space.strides = self.strides.clone();
        }
        if !self.orders.is_empty() {
            space.orders = self.orders.clone();
        }
        if self.rows.is_some() {
            space.rows = self.rows;
        }
        if self.big_endian {
            space.byte_order = ByteOrder::Big;
        }
        space
    }
}

/// Parse a cell coordinate written as `X,Y`
pub fn parse_cell(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid column '{}'", x.trim()))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("invalid row '{}'", y.trim()))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("85,95"), Ok((85, 95)));
        assert_eq!(parse_cell(" -3 , 4 "), Ok((-3, 4)));
        assert!(parse_cell("85").is_err());
        assert!(parse_cell("a,1").is_err());
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let args = LayoutArgs {
            strides: vec![170],
            big_endian: true,
            ..LayoutArgs::default()
        };
        let space = args.apply(CandidateSpace::default());

        assert_eq!(space.strides, vec![170]);
        assert_eq!(space.offsets, CandidateSpace::default().offsets);
        assert_eq!(space.byte_order, ByteOrder::Big);
        assert_eq!(space.rows, None);
    }

    #[test]
    fn test_apply_offset_range() {
        let args = LayoutArgs {
            offset_range: Some(OffsetRange::new(0, 1024, 4)),
            strides: vec![170],
            ..LayoutArgs::default()
        };
        let space = args.apply(CandidateSpace::default());
        assert!(space.offsets.is_empty());
        assert_eq!(space.len(), 256);
        assert_eq!(space.candidates()[1].offset, 4);

        let args = LayoutArgs {
            offsets: vec![2],
            offset_range: Some(OffsetRange::new(0, 8, 4)),
            strides: vec![170],
            ..LayoutArgs::default()
        };
        assert_eq!(args.apply(CandidateSpace::default()).offsets(), vec![2, 0, 4]);
    }
}
