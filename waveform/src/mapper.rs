//! Symbol Mapper
//!
//! Turns a symbol stream into the padded d x Nsym block that the spectral
//! allocator spreads over the data subcarriers.

use crate::WaveformError;
use common::Symbol;
use ndarray::{Array2, ShapeBuilder};
use rand::Rng;
use tracing::debug;

/// Padded per-symbol data-carrier assignment
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBlock {
    /// d x Nsym matrix, one column per OFDM symbol
    pub symbols: Array2<Symbol>,
    /// Stream length before padding
    pub data_length: usize,
    /// Number of padding symbols appended
    pub pad_length: usize,
}

impl SymbolBlock {
    /// Data carriers per OFDM symbol (d)
    pub fn data_carriers(&self) -> usize {
        self.symbols.nrows()
    }

    /// Number of OFDM symbols (Nsym)
    pub fn num_symbols(&self) -> usize {
        self.symbols.ncols()
    }
}

/// Draw `len` uniform one-based indices in [1, m]
pub fn generate_symbols<R: Rng + ?Sized>(len: usize, m: usize, rng: &mut R) -> Vec<usize> {
    (0..len).map(|_| rng.gen_range(1..=m)).collect()
}

/// Padding needed to make `len` a multiple of `d`
pub fn pad_length(len: usize, d: usize) -> usize {
    (d - len % d) % d
}

/// Pad a one-based index stream and reshape it column-major into d x Nsym
pub fn map_symbols(
    stream: &[usize],
    constellation_size: usize,
    d: usize,
) -> Result<SymbolBlock, WaveformError> {
    if d == 0 {
        return Err(WaveformError::ProcessingError(
            "no data carriers per symbol".to_string(),
        ));
    }

    let pad = pad_length(stream.len(), d);
    let mut padded = Vec::with_capacity(stream.len() + pad);
    for (pos, &index) in stream.iter().enumerate() {
        let symbol = Symbol::from_index(index, constellation_size).ok_or_else(|| {
            WaveformError::InvalidData(format!(
                "symbol {} at position {} is outside [1, {}]",
                index, pos, constellation_size
            ))
        })?;
        padded.push(symbol);
    }
    padded.resize(stream.len() + pad, Symbol::Pad);

    let num_symbols = padded.len() / d;
    let symbols = Array2::from_shape_vec((d, num_symbols).f(), padded)
        .map_err(|e| WaveformError::ProcessingError(format!("symbol reshape failed: {}", e)))?;

    debug!(
        "Mapped {} symbols into {}x{} block ({} padding)",
        stream.len(),
        d,
        num_symbols,
        pad
    );

    Ok(SymbolBlock {
        symbols,
        data_length: stream.len(),
        pad_length: pad,
    })
}
