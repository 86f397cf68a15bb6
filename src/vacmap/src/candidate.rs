//! Candidate layouts for a map dump
//!
//! A candidate names one guess at how the dump is laid out: how many header
//! bytes to skip, how each cell is encoded, and how many cells make a row.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Header sizes seen on common firmware, tried first
pub const COMMON_OFFSETS: &[usize] = &[0, 4, 8, 16, 20, 32, 48, 64, 128];

/// Pixel encoding of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[serde(alias = "uint8")]
    U8,
    #[serde(alias = "int8")]
    I8,
    #[serde(alias = "uint16")]
    U16,
    #[serde(alias = "int16")]
    I16,
    #[serde(alias = "uint32")]
    U32,
    #[serde(alias = "int32")]
    I32,
    #[serde(alias = "float32")]
    F32,
}

impl Encoding {
    pub const ALL: [Encoding; 7] = [
        Encoding::U8,
        Encoding::I8,
        Encoding::U16,
        Encoding::I16,
        Encoding::U32,
        Encoding::I32,
        Encoding::F32,
    ];

    /// Bytes occupied by one cell
    pub fn byte_width(self) -> usize {
        match self {
            Encoding::U8 | Encoding::I8 => 1,
            Encoding::U16 | Encoding::I16 => 2,
            Encoding::U32 | Encoding::I32 | Encoding::F32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::U8 => "u8",
            Encoding::I8 => "i8",
            Encoding::U16 => "u16",
            Encoding::I16 => "i16",
            Encoding::U32 => "u32",
            Encoding::I32 => "i32",
            Encoding::F32 => "f32",
        }
    }

    /// Read one cell from `bytes`, which must be exactly `byte_width()` long.
    ///
    /// Floats are truncated toward zero; NaN reads as 0.
    pub fn read(self, bytes: &[u8], order: ByteOrder) -> i64 {
        match (self, order) {
            (Encoding::U8, _) => bytes[0] as i64,
            (Encoding::I8, _) => bytes[0] as i8 as i64,
            (Encoding::U16, ByteOrder::Little) => LittleEndian::read_u16(bytes) as i64,
            (Encoding::U16, ByteOrder::Big) => BigEndian::read_u16(bytes) as i64,
            (Encoding::I16, ByteOrder::Little) => LittleEndian::read_i16(bytes) as i64,
            (Encoding::I16, ByteOrder::Big) => BigEndian::read_i16(bytes) as i64,
            (Encoding::U32, ByteOrder::Little) => LittleEndian::read_u32(bytes) as i64,
            (Encoding::U32, ByteOrder::Big) => BigEndian::read_u32(bytes) as i64,
            (Encoding::I32, ByteOrder::Little) => LittleEndian::read_i32(bytes) as i64,
            (Encoding::I32, ByteOrder::Big) => BigEndian::read_i32(bytes) as i64,
            (Encoding::F32, ByteOrder::Little) => LittleEndian::read_f32(bytes) as i64,
            (Encoding::F32, ByteOrder::Big) => BigEndian::read_f32(bytes) as i64,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u8" | "uint8" => Ok(Encoding::U8),
            "i8" | "int8" => Ok(Encoding::I8),
            "u16" | "uint16" => Ok(Encoding::U16),
            "i16" | "int16" => Ok(Encoding::I16),
            "u32" | "uint32" => Ok(Encoding::U32),
            "i32" | "int32" => Ok(Encoding::I32),
            "f32" | "float32" => Ok(Encoding::F32),
            other => Err(format!("unknown encoding '{}'", other)),
        }
    }
}

/// Byte order of multi-byte cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Order in which decoded cells fill the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Order {
    #[default]
    RowMajor,
    ColumnMajor,
}

impl Order {
    pub fn name(self) -> &'static str {
        match self {
            Order::RowMajor => "row-major",
            Order::ColumnMajor => "column-major",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "row-major" | "row" | "c" => Ok(Order::RowMajor),
            "column-major" | "column" | "col" | "f" => Ok(Order::ColumnMajor),
            other => Err(format!("unknown order '{}'", other)),
        }
    }
}

/// One guess at the layout of a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Header bytes skipped before the first cell
    pub offset: usize,
    pub encoding: Encoding,
    /// Cells per row (the grid's column count)
    pub stride: usize,
    #[serde(default)]
    pub byte_order: ByteOrder,
    #[serde(default)]
    pub order: Order,
    /// Fixed row count. When set, exactly `rows * stride` cells are read and
    /// any trailing bytes are ignored.
    #[serde(default)]
    pub rows: Option<usize>,
}

impl Candidate {
    pub fn new(offset: usize, encoding: Encoding, stride: usize) -> Self {
        Self {
            offset,
            encoding,
            stride,
            byte_order: ByteOrder::Little,
            order: Order::RowMajor,
            rows: None,
        }
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn byte_width(&self) -> usize {
        self.encoding.byte_width()
    }

    /// Short identifier usable in file names, e.g. `o16_u8_s170_r190`
    pub fn label(&self) -> String {
        let mut label = format!("o{}_{}_s{}", self.offset, self.encoding, self.stride);
        if let Some(rows) = self.rows {
            label.push_str(&format!("_r{}", rows));
        }
        if self.byte_order == ByteOrder::Big && self.byte_width() > 1 {
            label.push_str("_be");
        }
        if self.order == Order::ColumnMajor {
            label.push_str("_cm");
        }
        label
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset={} encoding={} stride={}",
            self.offset, self.encoding, self.stride
        )?;
        if let Some(rows) = self.rows {
            write!(f, " rows={}", rows)?;
        }
        if self.byte_width() > 1 {
            write!(f, " {:?}-endian", self.byte_order)?;
        }
        if self.order == Order::ColumnMajor {
            write!(f, " column-major")?;
        }
        Ok(())
    }
}

/// Offset sweep `start..end` in steps of `step`, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRange {
    pub start: usize,
    pub end: usize,
    #[serde(default = "default_step")]
    pub step: usize,
}

fn default_step() -> usize {
    1
}

impl OffsetRange {
    pub fn new(start: usize, end: usize, step: usize) -> Self {
        Self { start, end, step }
    }

    /// A zero step is treated as 1
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        (self.start..self.end).step_by(self.step.max(1))
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.end, self.step)
    }
}

impl FromStr for OffsetRange {
    type Err = String;

    /// `START:END` or `START:END:STEP`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let number = |part: &str| {
            part.parse::<usize>()
                .map_err(|_| format!("invalid offset '{}' in range '{}'", part, s))
        };

        let (start, end, step) = match parts.as_slice() {
            [start, end] => (number(start)?, number(end)?, 1),
            [start, end, step] => (number(start)?, number(end)?, number(step)?),
            _ => return Err(format!("expected START:END[:STEP] but got '{}'", s)),
        };
        if step == 0 {
            return Err("offset range step must be at least 1".to_string());
        }
        if start > end {
            return Err(format!("offset range start {} is past end {}", start, end));
        }

        Ok(Self { start, end, step })
    }
}

/// Cartesian product of candidate parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSpace {
    pub offsets: Vec<usize>,
    /// Swept after `offsets`, skipping offsets already listed
    #[serde(default)]
    pub offset_range: Option<OffsetRange>,
    pub encodings: Vec<Encoding>,
    pub strides: Vec<usize>,
    pub orders: Vec<Order>,
    pub byte_order: ByteOrder,
    pub rows: Option<usize>,
}

impl Default for CandidateSpace {
    fn default() -> Self {
        Self {
            offsets: COMMON_OFFSETS.to_vec(),
            offset_range: None,
            encodings: vec![Encoding::U8],
            strides: Vec::new(),
            orders: vec![Order::RowMajor],
            byte_order: ByteOrder::Little,
            rows: None,
        }
    }
}

impl CandidateSpace {
    /// Listed offsets in order, then the sweep without repeats
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets = self.offsets.clone();
        if let Some(range) = self.offset_range {
            let listed: HashSet<usize> = offsets.iter().copied().collect();
            offsets.extend(range.iter().filter(|offset| !listed.contains(offset)));
        }
        offsets
    }

    /// Expand into candidates ordered by offset, encoding, stride, then order
    pub fn candidates(&self) -> Vec<Candidate> {
        let offsets = self.offsets();
        let mut out = Vec::with_capacity(
            offsets.len() * self.encodings.len() * self.strides.len() * self.orders.len(),
        );

        for offset in offsets {
            for &encoding in &self.encodings {
                for &stride in &self.strides {
                    for &order in &self.orders {
                        out.push(Candidate {
                            offset,
                            encoding,
                            stride,
                            byte_order: self.byte_order,
                            order,
                            rows: self.rows,
                        });
                    }
                }
            }
        }

        out
    }

    pub fn len(&self) -> usize {
        self.offsets().len() * self.encodings.len() * self.strides.len() * self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
