//! Constellation view
//!
//! Scatter data for the transmitted symbols: the distinct constellation
//! points that occur in the stream, plus tick positions at every distinct
//! real and imaginary coordinate of the constellation. Rendering is left to
//! the caller; `render_text` gives a plain listing.

use crate::constellation::Constellation;
use std::fmt::Write;

/// Read-only scatter summary of a symbol stream
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationView {
    /// (one-based index, real, imaginary) of each distinct transmitted symbol
    pub points: Vec<(usize, f64, f64)>,
    /// Sorted distinct real coordinates of the constellation
    pub real_ticks: Vec<f64>,
    /// Sorted distinct imaginary coordinates of the constellation
    pub imag_ticks: Vec<f64>,
}

impl ConstellationView {
    /// Build the view from the pre-padding stream
    pub fn new(symbols: &[usize], constellation: &Constellation) -> Self {
        let mut used = vec![false; constellation.size()];
        for &s in symbols {
            if let Some(flag) = s.checked_sub(1).and_then(|i| used.get_mut(i)) {
                *flag = true;
            }
        }

        let points = constellation
            .points()
            .iter()
            .enumerate()
            .filter(|(i, _)| used[*i])
            .map(|(i, p)| (i + 1, p.re, p.im))
            .collect();

        Self {
            points,
            real_ticks: distinct(constellation.points().iter().map(|p| p.re)),
            imag_ticks: distinct(constellation.points().iter().map(|p| p.im)),
        }
    }

    /// Plain-text listing of ticks and points
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "real ticks: {:?}", self.real_ticks);
        let _ = writeln!(out, "imag ticks: {:?}", self.imag_ticks);
        for (index, re, im) in &self.points {
            let _ = writeln!(out, "{:>5}: {:+} {:+}i", index, re, im);
        }
        out
    }
}

fn distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup();
    v
}
