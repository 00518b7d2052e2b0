//! Common Types for optical OFDM generation
//!
//! Defines fundamental types shared by the waveform core, persistence and CLI

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when parsing the textual form of a common type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTypeError {
    #[error("Invalid OFDM variant: {0} (expected ACO, DCO or DMT)")]
    Variant(String),

    #[error("Invalid file type: {0} (expected text or binary)")]
    FileType(String),
}

/// OFDM modulation variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OfdmVariant {
    /// Asymmetrically clipped optical OFDM (odd subcarriers only)
    Aco,
    /// DC-biased optical OFDM
    #[default]
    Dco,
    /// Discrete multitone (DCO without bias)
    Dmt,
}

impl OfdmVariant {
    /// Spacing between data-carrying subcarriers below Nyquist
    pub fn frequency_hop(&self) -> usize {
        match self {
            OfdmVariant::Aco => 2,
            OfdmVariant::Dco | OfdmVariant::Dmt => 1,
        }
    }

    /// Number of data carriers per OFDM symbol for `n` subcarriers
    pub fn data_carriers(&self, n: usize) -> usize {
        match self {
            OfdmVariant::Aco => n / 4,
            OfdmVariant::Dco | OfdmVariant::Dmt => (n / 2).saturating_sub(1),
        }
    }

    /// Short upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            OfdmVariant::Aco => "ACO",
            OfdmVariant::Dco => "DCO",
            OfdmVariant::Dmt => "DMT",
        }
    }
}

impl fmt::Display for OfdmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfdmVariant {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACO" => Ok(OfdmVariant::Aco),
            "DCO" => Ok(OfdmVariant::Dco),
            "DMT" => Ok(OfdmVariant::Dmt),
            _ => Err(ParseTypeError::Variant(s.to_string())),
        }
    }
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileType {
    /// One decimal sample per line
    #[default]
    Text,
    /// Named native binary record
    Binary,
}

impl FileType {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Text => "txt",
            FileType::Binary => "bin",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Text => f.write_str("text"),
            FileType::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for FileType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(FileType::Text),
            "bin" | "binary" => Ok(FileType::Binary),
            _ => Err(ParseTypeError::FileType(s.to_string())),
        }
    }
}

/// Where and how a generated signal is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistencePlan {
    /// Output format
    pub file_type: FileType,
    /// Target file name; the format extension is appended when missing
    pub file_name: String,
}

impl PersistencePlan {
    /// Target path with the format extension applied
    pub fn target_path(&self) -> std::path::PathBuf {
        let path = std::path::PathBuf::from(&self.file_name);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension(self.file_type.extension())
        }
    }
}

/// One entry of the padded symbol matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Symbol {
    /// Zero-based position into the constellation
    Data(usize),
    /// Padding, transmitted as complex zero
    #[default]
    Pad,
}

impl Symbol {
    /// Build a data symbol from a one-based index in [1, M]
    pub fn from_index(index: usize, constellation_size: usize) -> Option<Self> {
        if index >= 1 && index <= constellation_size {
            Some(Symbol::Data(index - 1))
        } else {
            None
        }
    }

    /// Check whether this is the padding sentinel
    pub fn is_pad(&self) -> bool {
        matches!(self, Symbol::Pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        assert_eq!("aco".parse::<OfdmVariant>().unwrap(), OfdmVariant::Aco);
        assert_eq!(" DCO ".parse::<OfdmVariant>().unwrap(), OfdmVariant::Dco);
        assert_eq!("Dmt".parse::<OfdmVariant>().unwrap(), OfdmVariant::Dmt);
        assert_eq!(
            "pam".parse::<OfdmVariant>(),
            Err(ParseTypeError::Variant("pam".to_string()))
        );
    }

    #[test]
    fn test_data_carriers() {
        assert_eq!(OfdmVariant::Aco.data_carriers(64), 16);
        assert_eq!(OfdmVariant::Dco.data_carriers(64), 31);
        assert_eq!(OfdmVariant::Dmt.data_carriers(8), 3);
        assert_eq!(OfdmVariant::Aco.frequency_hop(), 2);
        assert_eq!(OfdmVariant::Dmt.frequency_hop(), 1);
    }

    #[test]
    fn test_file_type_parsing() {
        assert_eq!("txt".parse::<FileType>().unwrap(), FileType::Text);
        assert_eq!("Binary".parse::<FileType>().unwrap(), FileType::Binary);
        assert!("csv".parse::<FileType>().is_err());
        assert_eq!(FileType::Binary.extension(), "bin");
    }

    #[test]
    fn test_target_path() {
        let plan = PersistencePlan {
            file_type: FileType::Binary,
            file_name: "out/signal".to_string(),
        };
        assert_eq!(plan.target_path(), std::path::PathBuf::from("out/signal.bin"));

        let plan = PersistencePlan {
            file_type: FileType::Text,
            file_name: "signal.dat".to_string(),
        };
        assert_eq!(plan.target_path(), std::path::PathBuf::from("signal.dat"));
    }

    #[test]
    fn test_symbol_from_index() {
        assert_eq!(Symbol::from_index(1, 4), Some(Symbol::Data(0)));
        assert_eq!(Symbol::from_index(4, 4), Some(Symbol::Data(3)));
        assert_eq!(Symbol::from_index(0, 4), None);
        assert_eq!(Symbol::from_index(5, 4), None);
        assert!(Symbol::Pad.is_pad());
    }
}
