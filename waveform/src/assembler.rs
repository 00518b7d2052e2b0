//! Output Assembler
//!
//! Flattens the per-symbol time matrix into the transmittable sample
//! sequence and keeps the intermediate matrices for per-symbol views.

use crate::synthesizer::SynthesisOutput;
use ndarray::{Array2, ArrayView1, Axis};
use num_complex::Complex64;

/// Generated signal and its intermediate representations
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Column-major flattening of `time_matrix` (tSigV)
    pub samples: Vec<f64>,
    /// N x Nsym time-domain matrix after scale, offset and clipping (tSigM)
    pub time_matrix: Array2<f64>,
    /// N x Nsym frequency-domain matrix (fSigM)
    pub freq_matrix: Array2<Complex64>,
    /// One-based symbol stream before padding
    pub symbols: Vec<usize>,
    /// Number of padding symbols appended
    pub pad_length: usize,
    /// Per-symbol standard deviation used for the offset terms
    pub column_std_devs: Vec<f64>,
    /// Largest imaginary magnitude discarded after the IFFT
    pub max_imag_residue: f64,
}

impl Waveform {
    /// Assemble the output from the synthesizer result
    pub fn assemble(
        synthesis: SynthesisOutput,
        freq_matrix: Array2<Complex64>,
        symbols: Vec<usize>,
        pad_length: usize,
    ) -> Self {
        let samples = flatten_column_major(&synthesis.time);
        Self {
            samples,
            time_matrix: synthesis.time,
            freq_matrix,
            symbols,
            pad_length,
            column_std_devs: synthesis.column_std_devs,
            max_imag_residue: synthesis.max_imag_residue,
        }
    }

    /// Number of OFDM symbols (Nsym)
    pub fn num_symbols(&self) -> usize {
        self.time_matrix.ncols()
    }

    /// Samples per OFDM symbol (N)
    pub fn symbol_length(&self) -> usize {
        self.time_matrix.nrows()
    }

    /// Time-domain samples of one OFDM symbol
    pub fn symbol(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_symbols()).then(|| self.time_matrix.index_axis(Axis(1), index))
    }
}

/// All samples of column 0, then column 1, ...
pub fn flatten_column_major<T: Copy>(matrix: &Array2<T>) -> Vec<T> {
    matrix.t().iter().copied().collect()
}
