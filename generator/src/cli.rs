//! Command line arguments and their translation into generation options

use anyhow::{Context, Result};
use clap::Parser;
use waveform::GenerationOptions;

/// Optical OFDM waveform generator (DCO, ACO, DMT)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML file with generation options
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Number of random symbols, or an index list such as "[1,2,3]"
    #[arg(short, long)]
    pub data: Option<String>,

    /// OFDM variant (ACO, DCO, DMT)
    #[arg(short, long)]
    pub variant: Option<String>,

    /// Number of subcarriers (FFT size)
    #[arg(short = 'n', long)]
    pub subcarriers: Option<String>,

    /// Explicit constellation, e.g. "[1+1i, -1+1i, -1-1i, 1-1i]"
    #[arg(long)]
    pub constellation: Option<String>,

    /// Size of the default QAM constellation
    #[arg(short = 'm', long)]
    pub constellation_size: Option<String>,

    /// Amplitude scale
    #[arg(long, allow_hyphen_values = true)]
    pub scale: Option<String>,

    /// Offset added to every sample before clipping
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<String>,

    /// DCO bias in per-symbol standard deviations
    #[arg(long, allow_hyphen_values = true)]
    pub dco_offset_sd: Option<String>,

    /// ACO post-clip offset in per-symbol standard deviations
    #[arg(long, allow_hyphen_values = true)]
    pub aco_offset_sd: Option<String>,

    /// Lower clip bound ("-inf" disables)
    #[arg(long, allow_hyphen_values = true)]
    pub clip_low: Option<String>,

    /// Upper clip bound ("inf" disables)
    #[arg(long, allow_hyphen_values = true)]
    pub clip_high: Option<String>,

    /// Seed for reproducible random data
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Print the transmitted constellation
    #[arg(long)]
    pub show_constellation: bool,

    /// Output file type (text, binary)
    #[arg(short = 't', long)]
    pub file_type: Option<String>,

    /// Output file name
    #[arg(short = 'o', long)]
    pub file_name: Option<String>,

    /// Additional options as key=value
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Print samples to stdout; the file is then only written when a file
    /// type or name is given
    #[arg(long)]
    pub print: bool,
}

impl Args {
    /// Options given as flags, as (key, value) pairs
    fn flag_pairs(&self) -> Vec<String> {
        let flags = [
            ("data", &self.data),
            ("variant", &self.variant),
            ("subcarriers", &self.subcarriers),
            ("constellation", &self.constellation),
            ("constellation_size", &self.constellation_size),
            ("scale", &self.scale),
            ("offset", &self.offset),
            ("dco_offset_sd", &self.dco_offset_sd),
            ("aco_offset_sd", &self.aco_offset_sd),
            ("clip_low", &self.clip_low),
            ("clip_high", &self.clip_high),
            ("seed", &self.seed),
            ("file_type", &self.file_type),
            ("file_name", &self.file_name),
        ];

        flags
            .iter()
            .filter_map(|&(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
            .collect()
    }

    /// Build options: config file first, then flags, then `--set` pairs
    pub fn to_options(&self) -> Result<GenerationOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read configuration file {}", path))?;
                GenerationOptions::from_toml_str(&text)
                    .with_context(|| format!("Invalid configuration file {}", path))?
            }
            None => GenerationOptions::new(),
        };

        let pairs = self.flag_pairs();
        options.set_pairs(pairs.iter().map(String::as_str))?;
        options.set_pairs(self.set.iter().map(String::as_str))?;

        if self.show_constellation {
            options.show_constellation = Some(true);
        }
        options.output_requested = self.print;

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{FileType, OfdmVariant};
    use waveform::{DataSource, WaveformError};

    #[test]
    fn test_flags_to_options() {
        let args = Args::try_parse_from([
            "ofdm_gen",
            "--variant",
            "aco",
            "-n",
            "16",
            "--data",
            "[1,2,3]",
            "--clip-low",
            "-inf",
            "--seed",
            "4",
            "--set",
            "scale=2",
            "--print",
        ])
        .unwrap();

        let options = args.to_options().unwrap();
        assert_eq!(options.variant, Some(OfdmVariant::Aco));
        assert_eq!(options.subcarriers, Some(16));
        assert_eq!(options.data, Some(DataSource::Symbols(vec![1, 2, 3])));
        assert_eq!(options.clip_low, Some(f64::NEG_INFINITY));
        assert_eq!(options.seed, Some(4));
        assert_eq!(options.scale, Some(2.0));
        assert!(options.output_requested);

        let config = options.resolve().unwrap();
        assert_eq!(config.persistence, None);
    }

    #[test]
    fn test_file_flags_enable_persistence() {
        let args =
            Args::try_parse_from(["ofdm_gen", "--print", "-t", "binary", "-o", "run"]).unwrap();
        let plan = args.to_options().unwrap().resolve().unwrap().persistence.unwrap();
        assert_eq!(plan.file_type, FileType::Binary);
        assert_eq!(plan.file_name, "run");
    }

    #[test]
    fn test_without_print_signal_is_always_persisted() {
        let args = Args::try_parse_from(["ofdm_gen", "-v", "dmt"]).unwrap();
        let plan = args.to_options().unwrap().resolve().unwrap().persistence.unwrap();
        assert_eq!(plan.file_type, FileType::Text);
        assert_eq!(plan.file_name, "ofdm_signal");
    }

    #[test]
    fn test_unknown_set_key() {
        let args = Args::try_parse_from(["ofdm_gen", "--set", "foo=1"]).unwrap();
        let err = args.to_options().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WaveformError>(),
            Some(WaveformError::UnknownParameter(k)) if k == "foo"
        ));
    }

    #[test]
    fn test_bundled_aco_config() {
        let options = GenerationOptions::from_toml_str(include_str!("../configs/aco.toml")).unwrap();
        let config = options.resolve().unwrap();
        assert_eq!(config.variant, OfdmVariant::Aco);
        assert_eq!(config.data_carriers(), 16);
        assert_eq!(config.constellation.size(), 16);
        assert_eq!(config.data, DataSource::Length(10000));
        assert_eq!(config.aco_offset_sd, 0.5);
        assert_eq!(config.persistence.unwrap().file_name, "aco_signal");
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("ofdm_gen-{}-override.toml", std::process::id()));
        std::fs::write(&path, "variant = \"DMT\"\nsubcarriers = 32\n").unwrap();
        let path_text = path.to_string_lossy().into_owned();

        let args = Args::try_parse_from(["ofdm_gen", "-c", path_text.as_str(), "-n", "128"]).unwrap();
        let options = args.to_options().unwrap();
        assert_eq!(options.variant, Some(OfdmVariant::Dmt));
        assert_eq!(options.subcarriers, Some(128));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_config_file() {
        let args = Args::try_parse_from(["ofdm_gen", "-c", "/nonexistent/ofdm.toml"]).unwrap();
        assert!(args.to_options().is_err());
    }
}
