//! Optical OFDM Waveform Library
//!
//! This crate turns constellation symbol indices into a real-valued DCO, ACO
//! or DMT time-domain signal: parameter resolution, symbol mapping, Hermitian
//! subcarrier allocation, inverse transform with offset/clipping, and output
//! assembly.

pub mod config;
pub mod constellation;
pub mod mapper;
pub mod allocator;
pub mod synthesizer;
pub mod assembler;
pub mod pipeline;
pub mod view;

// Re-export commonly used types
pub use config::{Configuration, DataSource, GenerationOptions};
pub use constellation::Constellation;
pub use mapper::SymbolBlock;
pub use allocator::SpectralAllocator;
pub use synthesizer::{SynthesisOutput, SynthesisParams, WaveformSynthesizer};
pub use assembler::Waveform;
pub use pipeline::{generate, WaveformGenerator};
pub use view::ConstellationView;

use common::ParseTypeError;
use thiserror::Error;

/// Errors raised while resolving options or generating a waveform
#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("Invalid OFDM variant: {0} (expected ACO, DCO or DMT)")]
    InvalidVariant(String),

    #[error("Invalid constellation: {0}")]
    InvalidConstellation(String),

    #[error("Invalid file type: {0} (expected text or binary)")]
    InvalidFileType(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid subcarrier count: {0}")]
    InvalidSubcarrierCount(String),

    #[error("Invalid clip range: low={low}, high={high}")]
    InvalidClipRange { low: f64, high: f64 },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file error: {0}")]
    ConfigurationFile(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

impl From<ParseTypeError> for WaveformError {
    fn from(err: ParseTypeError) -> Self {
        match err {
            ParseTypeError::Variant(v) => WaveformError::InvalidVariant(v),
            ParseTypeError::FileType(v) => WaveformError::InvalidFileType(v),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log sink shared with a test subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` under a thread-local subscriber and return its WARN+ output
    pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
        (result, text)
    }
}
