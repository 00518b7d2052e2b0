//! Generation options and their resolution into an immutable configuration
//!
//! Options can be filled in three ways: directly through the typed fields,
//! through the string-keyed `set` (used by `--set key=value` on the command
//! line) or from a TOML table. All of them end in a single `resolve` pass
//! which validates everything before any signal is computed.

use crate::constellation::{Constellation, DEFAULT_CONSTELLATION_SIZE};
use crate::synthesizer::SynthesisParams;
use crate::WaveformError;
use common::{FileType, OfdmVariant, PersistencePlan};
use num_complex::Complex64;
use tracing::{debug, warn};

/// Default number of random symbols
pub const DEFAULT_DATA_LENGTH: usize = 1_000_000;

/// Default subcarrier count (FFT size)
pub const DEFAULT_SUBCARRIERS: usize = 64;

/// Default DCO bias in units of the per-symbol standard deviation
pub const DEFAULT_DCO_OFFSET_SD: f64 = 2.0;

/// Default output file name (without extension)
pub const DEFAULT_FILE_NAME: &str = "ofdm_signal";

/// Option names accepted by `GenerationOptions::set`
pub const OPTION_KEYS: &[&str] = &[
    "data",
    "variant",
    "subcarriers",
    "constellation",
    "constellation_size",
    "scale",
    "offset",
    "dco_offset_sd",
    "aco_offset_sd",
    "clip_low",
    "clip_high",
    "seed",
    "show_constellation",
    "file_type",
    "file_name",
];

/// Source of the symbol stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Draw this many uniform random indices
    Length(usize),
    /// Explicit one-based indices in [1, M]
    Symbols(Vec<usize>),
}

impl DataSource {
    /// Number of symbols before padding
    pub fn len(&self) -> usize {
        match self {
            DataSource::Length(n) => *n,
            DataSource::Symbols(s) => s.len(),
        }
    }

    /// Check whether no symbols would be produced
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether symbols are drawn at random
    pub fn is_random(&self) -> bool {
        matches!(self, DataSource::Length(_))
    }
}

/// Caller-facing generation options; unset fields take their defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    /// Symbol data or number of random symbols
    pub data: Option<DataSource>,
    /// OFDM variant
    pub variant: Option<OfdmVariant>,
    /// Subcarrier count N
    pub subcarriers: Option<usize>,
    /// Explicit constellation points
    pub constellation: Option<Vec<Complex64>>,
    /// Size of the default QAM constellation
    pub constellation_size: Option<usize>,
    /// Amplitude scale
    pub scale: Option<f64>,
    /// Scalar offset added before clipping
    pub offset: Option<f64>,
    /// DCO bias in units of the per-symbol standard deviation
    pub dco_offset_sd: Option<f64>,
    /// ACO post-clip offset in units of the per-symbol standard deviation
    pub aco_offset_sd: Option<f64>,
    /// Lower clip bound
    pub clip_low: Option<f64>,
    /// Upper clip bound
    pub clip_high: Option<f64>,
    /// Seed for random symbol generation
    pub seed: Option<u64>,
    /// Print the transmitted constellation
    pub show_constellation: Option<bool>,
    /// Output file format
    pub file_type: Option<FileType>,
    /// Output file name
    pub file_name: Option<String>,
    /// The caller consumes the generated samples itself
    pub output_requested: bool,
}

/// Resolved, validated generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub variant: OfdmVariant,
    pub subcarriers: usize,
    pub constellation: Constellation,
    pub data: DataSource,
    pub scale: f64,
    pub offset: f64,
    pub dco_offset_sd: f64,
    pub aco_offset_sd: f64,
    pub clip_low: f64,
    pub clip_high: f64,
    pub seed: Option<u64>,
    pub show_constellation: bool,
    /// `None` when nothing should be written
    pub persistence: Option<PersistencePlan>,
}

impl Configuration {
    /// Data carriers per OFDM symbol (d)
    pub fn data_carriers(&self) -> usize {
        self.variant.data_carriers(self.subcarriers)
    }

    /// Parameters consumed by the waveform synthesizer
    pub fn synthesis_params(&self) -> SynthesisParams {
        SynthesisParams {
            variant: self.variant,
            scale: self.scale,
            offset: self.offset,
            dco_offset_sd: self.dco_offset_sd,
            aco_offset_sd: self.aco_offset_sd,
            clip_low: self.clip_low,
            clip_high: self.clip_high,
        }
    }
}

impl GenerationOptions {
    /// Create empty options (all defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one option from its textual form
    ///
    /// The value is parsed before anything is assigned, so a failed call
    /// leaves the options untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), WaveformError> {
        let key = key.trim();
        let value = value.trim();

        match key {
            "data" => self.data = Some(parse_data(value)?),
            "variant" => self.variant = Some(value.parse()?),
            "subcarriers" => self.subcarriers = Some(parse_number(key, value)?),
            "constellation" => self.constellation = Some(parse_constellation(value)?),
            "constellation_size" => self.constellation_size = Some(parse_number(key, value)?),
            "scale" => self.scale = Some(parse_number(key, value)?),
            "offset" => self.offset = Some(parse_number(key, value)?),
            "dco_offset_sd" => self.dco_offset_sd = Some(parse_number(key, value)?),
            "aco_offset_sd" => self.aco_offset_sd = Some(parse_number(key, value)?),
            "clip_low" => self.clip_low = Some(parse_number(key, value)?),
            "clip_high" => self.clip_high = Some(parse_number(key, value)?),
            "seed" => self.seed = Some(parse_number(key, value)?),
            "show_constellation" => self.show_constellation = Some(parse_bool(key, value)?),
            "file_type" => self.file_type = Some(value.parse()?),
            "file_name" => {
                if value.is_empty() {
                    return Err(invalid_value(key, value));
                }
                self.file_name = Some(value.to_string());
            }
            _ => return Err(WaveformError::UnknownParameter(key.to_string())),
        }

        debug!("Option {} = {}", key, value);
        Ok(())
    }

    /// Apply `key=value` pairs; stops at the first failure without applying any
    pub fn set_pairs<'a, I>(&mut self, pairs: I) -> Result<(), WaveformError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut staged = self.clone();
        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| WaveformError::InvalidValue {
                key: pair.to_string(),
                value: "expected key=value".to_string(),
            })?;
            staged.set(key, value)?;
        }
        *self = staged;
        Ok(())
    }

    /// Apply every key of a TOML table; all or nothing
    pub fn apply_toml_str(&mut self, text: &str) -> Result<(), WaveformError> {
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| WaveformError::ConfigurationFile(e.to_string()))?;

        let mut staged = self.clone();
        for (key, value) in &table {
            let text = toml_value_text(key, value)?;
            staged.set(key, &text)?;
        }
        *self = staged;
        Ok(())
    }

    /// Load options from a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, WaveformError> {
        let mut options = Self::default();
        options.apply_toml_str(text)?;
        Ok(options)
    }

    /// Validate all options and fill in defaults
    pub fn resolve(&self) -> Result<Configuration, WaveformError> {
        let variant = self.variant.unwrap_or_default();

        let subcarriers = self.subcarriers.unwrap_or(DEFAULT_SUBCARRIERS);
        if subcarriers < 4 || subcarriers % 2 != 0 {
            return Err(WaveformError::InvalidSubcarrierCount(format!(
                "{} (must be even and at least 4)",
                subcarriers
            )));
        }
        if variant == OfdmVariant::Aco && subcarriers % 4 != 0 {
            return Err(WaveformError::InvalidSubcarrierCount(format!(
                "{} (ACO requires a multiple of 4)",
                subcarriers
            )));
        }

        let constellation = match (&self.constellation, self.constellation_size) {
            (Some(points), size) => {
                if let Some(size) = size.filter(|&s| s != points.len()) {
                    return Err(WaveformError::InvalidConstellation(format!(
                        "{} points given but constellation_size is {}",
                        points.len(),
                        size
                    )));
                }
                Constellation::new(points.clone())?
            }
            (None, size) => Constellation::qam(size.unwrap_or(DEFAULT_CONSTELLATION_SIZE))?,
        };
        if !constellation.is_power_of_two() {
            warn!(
                "Constellation size {} is not a power of two",
                constellation.size()
            );
        }

        let data = self
            .data
            .clone()
            .unwrap_or(DataSource::Length(DEFAULT_DATA_LENGTH));
        validate_data(&data, constellation.size())?;

        let clip_low = self.clip_low.unwrap_or(0.0);
        let clip_high = self.clip_high.unwrap_or(f64::INFINITY);
        if clip_low.is_nan() || clip_high.is_nan() || clip_low > clip_high {
            return Err(WaveformError::InvalidClipRange {
                low: clip_low,
                high: clip_high,
            });
        }

        let scale = finite("scale", self.scale.unwrap_or(1.0))?;
        let offset = finite("offset", self.offset.unwrap_or(0.0))?;
        let dco_offset_sd = finite("dco_offset_sd", self.dco_offset_sd.unwrap_or(DEFAULT_DCO_OFFSET_SD))?;
        let aco_offset_sd = finite("aco_offset_sd", self.aco_offset_sd.unwrap_or(0.0))?;

        let explicit_output = self.file_type.is_some() || self.file_name.is_some();
        let persistence = (explicit_output || !self.output_requested).then(|| PersistencePlan {
            file_type: self.file_type.unwrap_or_default(),
            file_name: self
                .file_name
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        });

        let config = Configuration {
            variant,
            subcarriers,
            constellation,
            data,
            scale,
            offset,
            dco_offset_sd,
            aco_offset_sd,
            clip_low,
            clip_high,
            seed: self.seed,
            show_constellation: self.show_constellation.unwrap_or(false),
            persistence,
        };

        debug!(
            "Resolved configuration: variant={}, N={}, M={}, d={}, data={}",
            config.variant,
            config.subcarriers,
            config.constellation.size(),
            config.data_carriers(),
            config.data.len()
        );

        Ok(config)
    }
}

fn validate_data(data: &DataSource, m: usize) -> Result<(), WaveformError> {
    match data {
        DataSource::Length(0) => Err(WaveformError::InvalidData(
            "data length must be positive".to_string(),
        )),
        DataSource::Length(_) => Ok(()),
        DataSource::Symbols(symbols) if symbols.is_empty() => Err(WaveformError::InvalidData(
            "symbol sequence is empty".to_string(),
        )),
        DataSource::Symbols(symbols) => {
            match symbols.iter().position(|&s| s < 1 || s > m) {
                Some(pos) => Err(WaveformError::InvalidData(format!(
                    "symbol {} at position {} is outside [1, {}]",
                    symbols[pos], pos, m
                ))),
                None => Ok(()),
            }
        }
    }
}

fn finite(key: &str, value: f64) -> Result<f64, WaveformError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_value(key, &value.to_string()))
    }
}

fn invalid_value(key: &str, value: &str) -> WaveformError {
    WaveformError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, WaveformError> {
    value.parse::<T>().map_err(|_| invalid_value(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, WaveformError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid_value(key, value)),
    }
}

/// Strip one pair of enclosing brackets
fn strip_brackets(value: &str) -> (&str, bool) {
    let trimmed = value.trim();
    match trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    }
}

/// Parse `data`: a bare integer is a length, a list is a symbol sequence
pub fn parse_data(value: &str) -> Result<DataSource, WaveformError> {
    let (inner, bracketed) = strip_brackets(value);
    if inner.contains(';') || inner.contains('[') {
        return Err(WaveformError::InvalidData(format!(
            "'{}' is not one-dimensional",
            value
        )));
    }

    let tokens: Vec<&str> = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    let indices = tokens
        .iter()
        .map(|t| t.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| {
            WaveformError::InvalidData(format!(
                "'{}' is neither a length nor a sequence of indices",
                value
            ))
        })?;

    match (bracketed, indices.as_slice()) {
        (false, [len]) => Ok(DataSource::Length(*len)),
        (_, []) => Err(WaveformError::InvalidData("no data given".to_string())),
        _ => Ok(DataSource::Symbols(indices)),
    }
}

/// Parse a one-dimensional list of complex numbers such as `[1+1i, -1-1i]`
pub fn parse_constellation(value: &str) -> Result<Vec<Complex64>, WaveformError> {
    let (inner, _) = strip_brackets(value);
    if inner.contains(';') || inner.contains('[') {
        return Err(WaveformError::InvalidConstellation(format!(
            "'{}' is not one-dimensional",
            value
        )));
    }

    let points = inner
        .split(',')
        .map(|t| t.split_whitespace().collect::<String>())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<Complex64>().map_err(|_| {
                WaveformError::InvalidConstellation(format!("cannot parse '{}' as a complex number", t))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if points.is_empty() {
        return Err(WaveformError::InvalidConstellation(
            "constellation is empty".to_string(),
        ));
    }
    Ok(points)
}

/// Render a TOML value in the textual form understood by `set`
fn toml_value_text(key: &str, value: &toml::Value) -> Result<String, WaveformError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Array(items) => {
            let nested = items.iter().any(|v| v.is_array());
            let parts = items
                .iter()
                .map(|v| toml_value_text(key, v))
                .collect::<Result<Vec<_>, _>>()?;
            let parts: Vec<String> = parts
                .into_iter()
                .map(|p| p.trim_start_matches('[').trim_end_matches(']').to_string())
                .collect();
            let sep = if nested { ";" } else { "," };
            Ok(format!("[{}]", parts.join(sep)))
        }
        other => Err(invalid_value(key, &other.to_string())),
    }
}
