//! Raw map dump loading
//!
//! A dump is treated as an opaque byte sequence until a candidate layout is
//! applied to it.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Immutable bytes of a map dump
#[derive(Debug, Clone)]
pub struct RawMapBuffer {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
}

impl RawMapBuffer {
    /// Wrap bytes that did not come from a file
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: None,
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Path the buffer was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// SHA-256 of the contents as lowercase hex
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }

    /// Hex dump of the first `count` bytes, 16 per line with offsets
    pub fn hex_preview(&self, count: usize) -> String {
        let end = count.min(self.bytes.len());
        self.bytes[..end]
            .chunks(16)
            .enumerate()
            .map(|(i, chunk)| format!("{:08x}  {}", i * 16, hex::encode(chunk)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Occurrence count of every byte value
    pub fn byte_histogram(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for &b in &self.bytes {
            counts[b as usize] += 1;
        }
        counts
    }
}

/// Read a dump from disk
pub fn load(path: impl AsRef<Path>) -> Result<RawMapBuffer> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    tracing::debug!("Loaded {} bytes from {}", bytes.len(), path.display());

    Ok(RawMapBuffer {
        path: Some(path.to_path_buf()),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.map");

        let err = load(&missing).unwrap_err();
        assert!(matches!(err, Error::NotFound { ref path } if *path == missing));
    }

    #[test]
    fn test_load_reads_bytes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("map_record.map");
        fs::write(&path, [0x7f, 0x00, 0x01]).unwrap();

        let buffer = load(&path).unwrap();
        assert_eq!(buffer.bytes(), &[0x7f, 0x00, 0x01]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("empty.map");
        fs::write(&path, [0u8; 0]).unwrap();

        let buffer = load(&path).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fingerprint() {
        let buffer = RawMapBuffer::from_bytes(b"abc".to_vec());
        assert_eq!(
            buffer.fingerprint(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hex_preview_wraps_lines() {
        let buffer = RawMapBuffer::from_bytes((0u8..20).collect::<Vec<_>>());
        let preview = buffer.hex_preview(18);
        let lines: Vec<_> = preview.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "00000000  000102030405060708090a0b0c0d0e0f");
        assert_eq!(lines[1], "00000010  1011");
    }

    #[test]
    fn test_byte_histogram() {
        let buffer = RawMapBuffer::from_bytes(vec![0, 0, 127, 255]);
        let counts = buffer.byte_histogram();
        assert_eq!(counts[0], 2);
        assert_eq!(counts[127], 1);
        assert_eq!(counts[255], 1);
        assert_eq!(counts[1], 0);
    }
}
