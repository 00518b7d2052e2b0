//! Spectral Allocator
//!
//! Places mapped symbols on the data subcarriers of each OFDM symbol and
//! mirrors them as complex conjugates into the upper half of the spectrum.
//! Bin 0 (DC) and bin N/2 (Nyquist) are never used, which keeps every
//! inverse-transformed column real.
//!
//! ACO uses every other subcarrier below Nyquist (bins 1, 3, ..., N/2 - 1);
//! DCO and DMT use all of bins 1 .. N/2 - 1.

use crate::constellation::Constellation;
use crate::mapper::SymbolBlock;
use crate::WaveformError;
use common::OfdmVariant;
use ndarray::{Array2, Axis};
use num_complex::Complex64;
use tracing::debug;

/// Subcarrier allocation for one variant and FFT size
#[derive(Debug, Clone)]
pub struct SpectralAllocator {
    /// FFT size (N)
    fft_size: usize,
    /// OFDM variant
    variant: OfdmVariant,
    /// Bins below Nyquist carrying data, in row order
    data_bins: Vec<usize>,
    /// Bins above Nyquist carrying the conjugate mirror, ascending
    mirror_bins: Vec<usize>,
}

impl SpectralAllocator {
    /// Create an allocator for `fft_size` subcarriers
    pub fn new(fft_size: usize, variant: OfdmVariant) -> Self {
        let hop = variant.frequency_hop();
        let half = fft_size / 2;
        let data_bins: Vec<usize> = (1..half).step_by(hop).collect();
        let mirror_bins: Vec<usize> = (half + 1..fft_size).step_by(hop).collect();

        Self {
            fft_size,
            variant,
            data_bins,
            mirror_bins,
        }
    }

    /// FFT size (N)
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// OFDM variant
    pub fn variant(&self) -> OfdmVariant {
        self.variant
    }

    /// Bins below Nyquist carrying data
    pub fn data_bins(&self) -> &[usize] {
        &self.data_bins
    }

    /// Bins above Nyquist carrying conjugates
    pub fn mirror_bins(&self) -> &[usize] {
        &self.mirror_bins
    }

    /// Build the N x Nsym Hermitian-symmetric frequency-domain matrix
    pub fn allocate(
        &self,
        block: &SymbolBlock,
        constellation: &Constellation,
    ) -> Result<Array2<Complex64>, WaveformError> {
        let d = self.data_bins.len();
        if block.data_carriers() != d || self.mirror_bins.len() != d {
            return Err(WaveformError::ProcessingError(format!(
                "symbol block has {} rows but {} {} allocates {} data bins",
                block.data_carriers(),
                self.variant,
                self.fft_size,
                d
            )));
        }

        let mut grid = Array2::<Complex64>::zeros((self.fft_size, block.num_symbols()));

        for (col, symbols) in block.symbols.axis_iter(Axis(1)).enumerate() {
            for (row, &symbol) in symbols.iter().enumerate() {
                let value = constellation.value(symbol).ok_or_else(|| {
                    WaveformError::InvalidData(format!(
                        "symbol {:?} is outside the {}-point constellation",
                        symbol,
                        constellation.size()
                    ))
                })?;
                grid[(self.data_bins[row], col)] = value;
                // Reverse row order above Nyquist so bin N - k holds conj(bin k)
                grid[(self.mirror_bins[d - 1 - row], col)] = value.conj();
            }
        }

        debug!(
            "Allocated {} OFDM symbols on {} {} data bins",
            block.num_symbols(),
            d,
            self.variant
        );

        Ok(grid)
    }
}

/// Check that every column satisfies X[N - k] = conj(X[k]) within `tolerance`
pub fn is_hermitian(grid: &Array2<Complex64>, tolerance: f64) -> bool {
    let n = grid.nrows();
    grid.axis_iter(Axis(1)).all(|column| {
        column[0].im.abs() <= tolerance
            && (n % 2 != 0 || column[n / 2].im.abs() <= tolerance)
            && (1..n).all(|k| (column[n - k] - column[k].conj()).norm() <= tolerance)
    })
}
