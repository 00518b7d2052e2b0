//! Waveform Synthesizer
//!
//! Inverse transforms each frequency-domain column and applies scaling,
//! bias and clipping. The order is fixed:
//!
//! 1. IFFT normalized by 1/sqrt(N), real part kept
//! 2. multiply by `scale`
//! 3. per-column sample standard deviation, computed once
//! 4. DCO only: add `dco_offset_sd * std`
//! 5. add `offset`
//! 6. clamp into [`clip_low`, `clip_high`]
//! 7. ACO only: add `aco_offset_sd * std` (after the clip)

use crate::WaveformError;
use common::{max_imag_residue, sample_std_dev, OfdmVariant};
use ndarray::{Array2, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, trace};

/// Imaginary residue above which the transform is reported as non-real
const IMAG_RESIDUE_WARN: f64 = 1e-9;

/// Scaling, bias and clipping parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub variant: OfdmVariant,
    pub scale: f64,
    pub offset: f64,
    pub dco_offset_sd: f64,
    pub aco_offset_sd: f64,
    pub clip_low: f64,
    pub clip_high: f64,
}

/// Time-domain result of one synthesis run
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// N x Nsym real samples after all steps
    pub time: Array2<f64>,
    /// Per-column standard deviation of the scaled signal (step 3)
    pub column_std_devs: Vec<f64>,
    /// Largest imaginary magnitude discarded after the IFFT
    pub max_imag_residue: f64,
}

/// Inverse-FFT based OFDM synthesizer for a fixed FFT size
pub struct WaveformSynthesizer {
    /// FFT size
    fft_size: usize,
    /// IFFT plan (pre-computed for performance)
    ifft: Arc<dyn Fft<f64>>,
    /// 1/sqrt(N)
    normalization: f64,
}

impl WaveformSynthesizer {
    /// Create a new synthesizer
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(fft_size);

        Self {
            fft_size,
            ifft,
            normalization: 1.0 / (fft_size as f64).sqrt(),
        }
    }

    /// FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Step 1: inverse transform every column, keeping the real part
    ///
    /// Returns the real matrix and the largest discarded imaginary part.
    pub fn inverse_transform(
        &self,
        freq: &Array2<Complex64>,
    ) -> Result<(Array2<f64>, f64), WaveformError> {
        if freq.nrows() != self.fft_size {
            return Err(WaveformError::ProcessingError(format!(
                "Expected {} subcarriers, got {}",
                self.fft_size,
                freq.nrows()
            )));
        }

        let mut time = Array2::<f64>::zeros(freq.dim());
        let mut residue: f64 = 0.0;
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.fft_size];

        for (column, mut out) in freq.axis_iter(Axis(1)).zip(time.axis_iter_mut(Axis(1))) {
            for (slot, &value) in buffer.iter_mut().zip(column.iter()) {
                *slot = value;
            }
            self.ifft.process(&mut buffer);

            for (sample, value) in out.iter_mut().zip(buffer.iter()) {
                *sample = value.re * self.normalization;
            }
            residue = residue.max(max_imag_residue(&buffer) * self.normalization);
        }

        if residue > IMAG_RESIDUE_WARN {
            debug!("IFFT imaginary residue {:.3e} above {:.0e}", residue, IMAG_RESIDUE_WARN);
        }

        Ok((time, residue))
    }

    /// Run all synthesis steps on a frequency-domain matrix
    pub fn synthesize(
        &self,
        freq: &Array2<Complex64>,
        params: &SynthesisParams,
    ) -> Result<SynthesisOutput, WaveformError> {
        if params.clip_low.is_nan() || params.clip_high.is_nan() || params.clip_low > params.clip_high
        {
            return Err(WaveformError::InvalidClipRange {
                low: params.clip_low,
                high: params.clip_high,
            });
        }

        let (mut time, max_imag_residue) = self.inverse_transform(freq)?;

        time.mapv_inplace(|x| x * params.scale);

        let column_std_devs: Vec<f64> = time
            .axis_iter(Axis(1))
            .map(|column| sample_std_dev(column.iter().copied()))
            .collect();

        for (mut column, &std_dev) in time.axis_iter_mut(Axis(1)).zip(column_std_devs.iter()) {
            if params.variant == OfdmVariant::Dco {
                column.mapv_inplace(|x| x + params.dco_offset_sd * std_dev);
            }

            column.mapv_inplace(|x| (x + params.offset).clamp(params.clip_low, params.clip_high));

            if params.variant == OfdmVariant::Aco {
                column.mapv_inplace(|x| x + params.aco_offset_sd * std_dev);
            }
        }

        trace!("Synthesized {} OFDM symbols of {} samples", time.ncols(), time.nrows());

        Ok(SynthesisOutput {
            time,
            column_std_devs,
            max_imag_residue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn params(variant: OfdmVariant) -> SynthesisParams {
        SynthesisParams {
            variant,
            scale: 1.0,
            offset: 0.0,
            dco_offset_sd: 0.0,
            aco_offset_sd: 0.0,
            clip_low: f64::NEG_INFINITY,
            clip_high: f64::INFINITY,
        }
    }

    /// Single real cosine on bin `k` (with its mirror)
    fn tone(n: usize, k: usize) -> Array2<Complex64> {
        let mut freq = Array2::<Complex64>::zeros((n, 1));
        freq[(k, 0)] = Complex64::new(1.0, 0.0);
        freq[(n - k, 0)] = Complex64::new(1.0, 0.0);
        freq
    }

    #[test]
    fn test_inverse_transform_normalization() {
        let n = 16;
        let synth = WaveformSynthesizer::new(n);
        let (time, residue) = synth.inverse_transform(&tone(n, 2)).unwrap();

        // x[t] = (1/sqrt(N)) * 2 cos(2 pi k t / N)
        for t in 0..n {
            let expected = 2.0 * (2.0 * PI * 2.0 * t as f64 / n as f64).cos() / (n as f64).sqrt();
            assert!((time[(t, 0)] - expected).abs() < 1e-12);
        }
        assert!(residue < 1e-12);
    }

    #[test]
    fn test_invalid_clip_range() {
        let synth = WaveformSynthesizer::new(8);
        let freq = tone(8, 1);

        let mut inverted = params(OfdmVariant::Dco);
        inverted.clip_low = 1.0;
        inverted.clip_high = 0.0;
        assert!(matches!(
            synth.synthesize(&freq, &inverted),
            Err(WaveformError::InvalidClipRange { .. })
        ));

        let mut nan = params(OfdmVariant::Aco);
        nan.clip_high = f64::NAN;
        assert!(matches!(
            synth.synthesize(&freq, &nan),
            Err(WaveformError::InvalidClipRange { .. })
        ));
    }

    #[test]
    fn test_wrong_fft_size() {
        let synth = WaveformSynthesizer::new(8);
        let freq = Array2::<Complex64>::zeros((16, 1));
        assert!(matches!(
            synth.inverse_transform(&freq),
            Err(WaveformError::ProcessingError(_))
        ));
    }

    #[test]
    fn test_dco_bias_before_clip() {
        let n = 16;
        let synth = WaveformSynthesizer::new(n);
        let freq = tone(n, 1);
        let plain = synth.synthesize(&freq, &params(OfdmVariant::Dco)).unwrap();
        let sd = plain.column_std_devs[0];
        assert!(sd > 0.0);

        let p = SynthesisParams {
            dco_offset_sd: 2.0,
            offset: 0.1,
            clip_low: 0.0,
            clip_high: 0.5,
            ..params(OfdmVariant::Dco)
        };
        let out = synth.synthesize(&freq, &p).unwrap();
        assert_eq!(out.column_std_devs, plain.column_std_devs);
        for (y, x) in out.time.iter().zip(plain.time.iter()) {
            let expected = (x + 2.0 * sd + 0.1).clamp(0.0, 0.5);
            assert!((y - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_aco_offset_after_clip() {
        let n = 16;
        let synth = WaveformSynthesizer::new(n);
        let freq = tone(n, 1);
        let plain = synth.synthesize(&freq, &params(OfdmVariant::Aco)).unwrap();
        let sd = plain.column_std_devs[0];

        let p = SynthesisParams {
            aco_offset_sd: 0.5,
            clip_low: 0.0,
            clip_high: 0.2,
            ..params(OfdmVariant::Aco)
        };
        let out = synth.synthesize(&freq, &p).unwrap();
        for (y, x) in out.time.iter().zip(plain.time.iter()) {
            let expected = x.clamp(0.0, 0.2) + 0.5 * sd;
            assert!((y - expected).abs() < 1e-12);
        }
        // The post-clip term lifts the maximum exactly above clip_high
        let max = out.time.iter().cloned().fold(f64::MIN, f64::max);
        assert!((max - (0.2 + 0.5 * sd)).abs() < 1e-12);
    }

    #[test]
    fn test_dmt_ignores_offset_multipliers() {
        let n = 8;
        let synth = WaveformSynthesizer::new(n);
        let freq = tone(n, 3);
        let p = SynthesisParams {
            dco_offset_sd: 3.0,
            aco_offset_sd: 3.0,
            ..params(OfdmVariant::Dmt)
        };
        let biased = synth.synthesize(&freq, &p).unwrap();
        let plain = synth.synthesize(&freq, &params(OfdmVariant::Dmt)).unwrap();
        assert_eq!(biased.time, plain.time);
    }

    #[test]
    fn test_scale_applies_before_std_dev() {
        let n = 16;
        let synth = WaveformSynthesizer::new(n);
        let freq = tone(n, 4);
        let one = synth.synthesize(&freq, &params(OfdmVariant::Dco)).unwrap();
        let p = SynthesisParams {
            scale: 3.0,
            ..params(OfdmVariant::Dco)
        };
        let three = synth.synthesize(&freq, &p).unwrap();
        assert!((three.column_std_devs[0] - 3.0 * one.column_std_devs[0]).abs() < 1e-12);
    }
}
