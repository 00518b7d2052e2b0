//! Constellation Provider
//!
//! Rectangular QAM point sets and the lookup used by the spectral allocator.
//! Padding symbols map to complex zero, so a constellation of size M behaves
//! as an extended table of M + 1 entries.

use crate::WaveformError;
use common::{complex_zero, gray_to_binary, is_power_of_two, largest_divisor_below_sqrt, Symbol};
use num_complex::Complex64;
use tracing::debug;

/// Default constellation size when none is configured
pub const DEFAULT_CONSTELLATION_SIZE: usize = 64;

/// Ordered set of complex constellation points
#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    points: Vec<Complex64>,
}

impl Constellation {
    /// Wrap an explicit point list
    pub fn new(points: Vec<Complex64>) -> Result<Self, WaveformError> {
        if points.is_empty() {
            return Err(WaveformError::InvalidConstellation(
                "constellation must contain at least one point".to_string(),
            ));
        }
        if let Some(bad) = points.iter().find(|p| !p.re.is_finite() || !p.im.is_finite()) {
            return Err(WaveformError::InvalidConstellation(format!(
                "non-finite constellation point {}",
                bad
            )));
        }
        Ok(Self { points })
    }

    /// Default rectangular QAM mapping of size `m`
    pub fn qam(m: usize) -> Result<Self, WaveformError> {
        if m == 0 {
            return Err(WaveformError::InvalidConstellation(
                "constellation size must be positive".to_string(),
            ));
        }
        Self::new(qam_constellation(m))
    }

    /// Number of points (M)
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// All points in index order
    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    /// Complex value carried by a symbol, `None` for an index past M
    pub fn value(&self, symbol: Symbol) -> Option<Complex64> {
        match symbol {
            Symbol::Data(k) => self.points.get(k).copied(),
            Symbol::Pad => Some(complex_zero()),
        }
    }

    /// Check whether M is a power of two
    pub fn is_power_of_two(&self) -> bool {
        is_power_of_two(self.points.len())
    }
}

/// Build an `m`-point rectangular QAM constellation
///
/// Points sit on odd-integer levels. Index `k` selects column `k / rows` and
/// row `k % rows`, columns running left to right and rows top to bottom.
/// Each axis is Gray coded when its length is a power of two.
pub fn qam_constellation(m: usize) -> Vec<Complex64> {
    let rows = largest_divisor_below_sqrt(m);
    let cols = m / rows;
    debug!("QAM constellation: M={} as {}x{} grid", m, cols, rows);

    let axis_position = |bits: usize, len: usize| {
        if is_power_of_two(len) {
            gray_to_binary(bits)
        } else {
            bits
        }
    };

    (0..m)
        .map(|k| {
            let col = axis_position(k / rows, cols);
            let row = axis_position(k % rows, rows);
            let re = 2.0 * col as f64 - (cols as f64 - 1.0);
            let im = (rows as f64 - 1.0) - 2.0 * row as f64;
            Complex64::new(re, im)
        })
        .collect()
}
