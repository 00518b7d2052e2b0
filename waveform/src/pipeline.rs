//! Generation pipeline
//!
//! Runs symbol mapping, spectral allocation, synthesis and assembly for a
//! resolved configuration.

use crate::allocator::SpectralAllocator;
use crate::assembler::Waveform;
use crate::config::{Configuration, DataSource, GenerationOptions};
use crate::mapper::{generate_symbols, map_symbols};
use crate::synthesizer::WaveformSynthesizer;
use crate::WaveformError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// OFDM waveform generator for one configuration
pub struct WaveformGenerator {
    config: Configuration,
    allocator: SpectralAllocator,
    synthesizer: WaveformSynthesizer,
}

impl WaveformGenerator {
    /// Create a generator, planning the IFFT once
    pub fn new(config: Configuration) -> Self {
        let allocator = SpectralAllocator::new(config.subcarriers, config.variant);
        let synthesizer = WaveformSynthesizer::new(config.subcarriers);
        Self {
            config,
            allocator,
            synthesizer,
        }
    }

    /// Resolved configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Random source for this run: seeded when a seed is configured
    pub fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                if self.config.data.is_random() {
                    warn!("No seed given; random symbol data is not reproducible");
                }
                StdRng::from_entropy()
            }
        }
    }

    /// Generate the waveform using the configured seed (or entropy)
    pub fn generate(&self) -> Result<Waveform, WaveformError> {
        let mut rng = self.rng();
        self.generate_with_rng(&mut rng)
    }

    /// Generate the waveform drawing random symbols from `rng`
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Waveform, WaveformError> {
        let m = self.config.constellation.size();
        let symbols = match &self.config.data {
            DataSource::Length(len) => generate_symbols(*len, m, rng),
            DataSource::Symbols(symbols) => symbols.clone(),
        };

        let block = map_symbols(&symbols, m, self.config.data_carriers())?;
        let freq = self.allocator.allocate(&block, &self.config.constellation)?;
        let synthesis = self
            .synthesizer
            .synthesize(&freq, &self.config.synthesis_params())?;

        debug!(
            "Synthesis done: residue={:.3e}, std devs={}",
            synthesis.max_imag_residue,
            synthesis.column_std_devs.len()
        );

        let waveform = Waveform::assemble(synthesis, freq, symbols, block.pad_length);

        info!(
            "Generated {} {} OFDM symbols ({} samples, N={}, M={})",
            waveform.num_symbols(),
            self.config.variant,
            waveform.samples.len(),
            self.config.subcarriers,
            m
        );

        Ok(waveform)
    }
}

/// Resolve `options` and generate a waveform
pub fn generate(options: &GenerationOptions) -> Result<(Configuration, Waveform), WaveformError> {
    let config = options.resolve()?;
    let generator = WaveformGenerator::new(config);
    let waveform = generator.generate()?;
    Ok((generator.config, waveform))
}
