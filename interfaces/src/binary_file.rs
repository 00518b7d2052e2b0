//! Binary persistence: a bincode-encoded `NamedSignal`

use crate::{InterfaceError, NamedSignal};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Write a named signal as a native binary record
pub fn write_binary(path: &Path, signal: &NamedSignal) -> Result<(), InterfaceError> {
    let file = File::create(path).map_err(|source| InterfaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    bincode::serialize_into(&mut writer, signal).map_err(|source| {
        InterfaceError::SerializationError {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(|source| InterfaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Wrote binary signal '{}' ({} samples) to {}",
        signal.name,
        signal.samples.len(),
        path.display()
    );
    Ok(())
}

/// Read a record written by `write_binary`
pub fn read_binary(path: &Path) -> Result<NamedSignal, InterfaceError> {
    let file = File::open(path).map_err(|source| InterfaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    bincode::deserialize_from(BufReader::new(file)).map_err(|source| {
        InterfaceError::SerializationError {
            path: path.to_path_buf(),
            source,
        }
    })
}
