//! Signal Persistence Interfaces Library
//!
//! This crate writes generated sample sequences to disk and reads them back,
//! either as decimal text or as a named native binary record.

pub mod signal_types;
pub mod text_file;
pub mod binary_file;

pub use signal_types::NamedSignal;

use common::{FileType, PersistencePlan};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {source}")]
    SerializationError {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("Invalid sample in {path} at line {line}: {text}")]
    InvalidSample {
        path: PathBuf,
        line: usize,
        text: String,
    },
}

/// Write `samples` according to `plan`, returning the path written
pub fn persist(plan: &PersistencePlan, samples: &[f64]) -> Result<PathBuf, InterfaceError> {
    let path = plan.target_path();
    match plan.file_type {
        FileType::Text => text_file::write_text(&path, samples)?,
        FileType::Binary => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| plan.file_name.clone());
            binary_file::write_binary(&path, &NamedSignal::new(name, samples.to_vec()))?
        }
    }

    info!(
        "Wrote {} samples to {} ({})",
        samples.len(),
        path.display(),
        plan.file_type
    );
    Ok(path)
}

/// Read samples back in the format given by `file_type`
pub fn load(path: &std::path::Path, file_type: FileType) -> Result<Vec<f64>, InterfaceError> {
    match file_type {
        FileType::Text => text_file::read_text(path),
        FileType::Binary => Ok(binary_file::read_binary(path)?.samples),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_path;

    #[test]
    fn test_persist_text_appends_extension() {
        let base = scratch_path("persist_text");
        let plan = PersistencePlan {
            file_type: FileType::Text,
            file_name: base.to_string_lossy().into_owned(),
        };
        let samples = vec![0.5, -1.25, 3.0e-7];
        let path = persist(&plan, &samples).unwrap();
        assert_eq!(path.extension().unwrap(), "txt");
        assert_eq!(load(&path, FileType::Text).unwrap(), samples);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_persist_binary_uses_stem_as_name() {
        let base = scratch_path("persist_bin");
        let plan = PersistencePlan {
            file_type: FileType::Binary,
            file_name: base.to_string_lossy().into_owned(),
        };
        let samples = vec![1.0, 2.0, f64::MIN_POSITIVE];
        let path = persist(&plan, &samples).unwrap();
        let signal = binary_file::read_binary(&path).unwrap();
        assert_eq!(signal.name, base.file_name().unwrap().to_string_lossy());
        assert_eq!(load(&path, FileType::Binary).unwrap(), samples);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_persist_reports_target_on_failure() {
        let plan = PersistencePlan {
            file_type: FileType::Text,
            file_name: scratch_path("missing-dir/out.txt").to_string_lossy().into_owned(),
        };
        match persist(&plan, &[1.0]) {
            Err(InterfaceError::Io { path, .. }) => assert!(path.ends_with("out.txt")),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }
}
