//! Dump inspection

use anyhow::{Context, Result};
use std::path::Path;
use vacmap::metadata::RECORD_FILE;
use vacmap::{MapRecord, RawMapBuffer};

use super::sibling_record;

/// Handle the inspect command
pub fn handle(input: &Path, bytes: usize, top: usize) -> Result<()> {
    let buffer =
        vacmap::load(input).with_context(|| format!("Failed to load {}", input.display()))?;

    println!("File:     {}", input.display());
    println!("Size:     {} bytes", buffer.len());
    println!("SHA-256:  {}", buffer.fingerprint());

    if buffer.is_empty() {
        println!();
        println!("File is empty; no layout can describe it.");
        return Ok(());
    }

    println!();
    println!("First {} bytes:", bytes.min(buffer.len()));
    for line in buffer.hex_preview(bytes).lines() {
        println!("  {}", line);
    }

    let histogram = buffer.byte_histogram();
    let distinct = histogram.iter().filter(|&&n| n > 0).count();
    println!();
    println!("Distinct byte values: {}", distinct);
    for (value, count) in top_bytes(&histogram, top) {
        let share = count as f64 * 100.0 / buffer.len() as f64;
        println!("  0x{:02x} ({:3}): {:>8} ({:5.1}%)", value, value, count, share);
    }

    match sibling_record(input) {
        Ok(Some(record)) => {
            println!();
            print_record_fit(&buffer, &record);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Ignoring sidecar record: {:#}", e),
    }

    Ok(())
}

/// Most frequent byte values, highest count first, ties by value
fn top_bytes(histogram: &[usize; 256], n: usize) -> Vec<(u8, usize)> {
    let mut counts: Vec<(u8, usize)> = histogram
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(value, &count)| (value as u8, count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts.truncate(n);
    counts
}

fn print_record_fit(buffer: &RawMapBuffer, record: &MapRecord) {
    let cells = record.width.saturating_mul(record.height);
    println!(
        "{}: {}x{} cells at {} m/cell",
        RECORD_FILE, record.width, record.height, record.resolution
    );

    if buffer.len() >= cells {
        println!(
            "  {} bytes left over for a header or trailer at one byte per cell",
            buffer.len() - cells
        );
    } else {
        println!(
            "  Dump is {} bytes short of one byte per cell",
            cells - buffer.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_top_bytes_order() {
        let mut histogram = [0usize; 256];
        histogram[0] = 10;
        histogram[127] = 30;
        histogram[255] = 10;
        histogram[3] = 1;

        let top = top_bytes(&histogram, 3);
        assert_eq!(top, vec![(127, 30), (0, 10), (255, 10)]);
    }

    #[test]
    fn test_sibling_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let map = temp_dir.path().join("map_record.map");
        assert!(sibling_record(&map).unwrap().is_none());

        fs::write(
            temp_dir.path().join(RECORD_FILE),
            r#"{"width": 10, "height": 4, "resolution": 0.05, "x_min": 0, "y_min": 0}"#,
        )
        .unwrap();
        let record = sibling_record(&map).unwrap().unwrap();
        assert_eq!((record.width, record.height), (10, 4));
    }

    #[test]
    fn test_handle_runs_on_small_dump() {
        let temp_dir = tempfile::tempdir().unwrap();
        let map = temp_dir.path().join("dump.bin");
        fs::write(&map, [0u8, 0, 127, 255, 1, 2]).unwrap();
        handle(&map, 4, 2).unwrap();
    }

    #[test]
    fn test_handle_missing_file() {
        let err = handle(Path::new("/nonexistent/dump.bin"), 16, 4).unwrap_err();
        assert!(err.to_string().contains("dump.bin"));
    }
}
