//! Text persistence: one decimal sample per line
//!
//! Samples are written with Rust's shortest round-trip formatting, so reading
//! the file back gives the exact same values.

use crate::InterfaceError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Write samples as decimal text, one per line
pub fn write_text(path: &Path, samples: &[f64]) -> Result<(), InterfaceError> {
    let io_err = |source: std::io::Error| InterfaceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for sample in samples {
        writeln!(writer, "{}", sample).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    debug!("Wrote {} text samples to {}", samples.len(), path.display());
    Ok(())
}

/// Read a text file written by `write_text`; blank lines are skipped
pub fn read_text(path: &Path) -> Result<Vec<f64>, InterfaceError> {
    let io_err = |source: std::io::Error| InterfaceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut samples = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let value = text.parse::<f64>().map_err(|_| InterfaceError::InvalidSample {
            path: path.to_path_buf(),
            line: index + 1,
            text: text.to_string(),
        })?;
        samples.push(value);
    }

    Ok(samples)
}
