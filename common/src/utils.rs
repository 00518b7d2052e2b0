//! Common Utilities
//!
//! Numeric helpers shared by the waveform core

use num_complex::Complex64;
use num_traits::Zero;
use tracing::trace;

/// Check whether `n` is a power of two (zero is not)
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Convert a Gray-coded value to its binary position
pub fn gray_to_binary(gray: usize) -> usize {
    let mut binary = gray;
    let mut shift = gray >> 1;
    while shift != 0 {
        binary ^= shift;
        shift >>= 1;
    }
    binary
}

/// Largest divisor of `n` that does not exceed its square root
pub fn largest_divisor_below_sqrt(n: usize) -> usize {
    let mut best = 1;
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            best = d;
        }
        d += 1;
    }
    best
}

/// Sample standard deviation (N - 1 denominator)
///
/// Returns zero for fewer than two samples.
pub fn sample_std_dev<I>(samples: I) -> f64
where
    I: Iterator<Item = f64> + Clone,
{
    let (count, sum) = samples
        .clone()
        .fold((0usize, 0.0), |(n, s), x| (n + 1, s + x));
    if count < 2 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let var = samples.map(|x| (x - mean) * (x - mean)).sum::<f64>() / (count - 1) as f64;
    trace!("std dev over {} samples: mean={:.6}, var={:.6}", count, mean, var);
    var.sqrt()
}

/// Largest imaginary magnitude in a sequence of complex samples
pub fn max_imag_residue<'a, I>(samples: I) -> f64
where
    I: IntoIterator<Item = &'a Complex64>,
{
    samples
        .into_iter()
        .map(|c| c.im.abs())
        .fold(0.0, f64::max)
}

/// Complex zero, used for the padding symbol
pub fn complex_zero() -> Complex64 {
    Complex64::zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_power_of_two() {
        assert!(!is_power_of_two(0));
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(64));
        assert!(!is_power_of_two(48));
    }

    #[test]
    fn test_gray_to_binary() {
        // 3-bit Gray sequence 000 001 011 010 110 111 101 100
        let gray = [0b000, 0b001, 0b011, 0b010, 0b110, 0b111, 0b101, 0b100];
        for (pos, &g) in gray.iter().enumerate() {
            assert_eq!(gray_to_binary(g), pos);
        }
    }

    #[test]
    fn test_largest_divisor() {
        assert_eq!(largest_divisor_below_sqrt(64), 8);
        assert_eq!(largest_divisor_below_sqrt(32), 4);
        assert_eq!(largest_divisor_below_sqrt(6), 2);
        assert_eq!(largest_divisor_below_sqrt(7), 1);
    }

    #[test]
    fn test_sample_std_dev() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population std is 2, sample std is sqrt(32/7)
        let sd = sample_std_dev(data.iter().copied());
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std_dev([3.0].iter().copied()), 0.0);
    }

    #[test]
    fn test_max_imag_residue() {
        let v = [Complex64::new(1.0, 1e-9), Complex64::new(0.0, -2e-9)];
        assert_eq!(max_imag_residue(&v), 2e-9);
        assert_eq!(complex_zero(), Complex64::new(0.0, 0.0));
    }
}
