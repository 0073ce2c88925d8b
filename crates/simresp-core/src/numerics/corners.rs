use crate::domain::{ResponseError, ResponseResult};
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

/// Half-power points bounding the passband, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerFrequencies {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl CornerFrequencies {
    /// Limits the high corner to `ceiling_fraction * sample_rate` and keeps
    /// the low corner at or below the high corner.
    pub fn clamped(self, sample_rate: f64, ceiling_fraction: f64) -> Self {
        let high_hz = self.high_hz.min(ceiling_fraction * sample_rate);
        let low_hz = self.low_hz.min(high_hz);
        Self { low_hz, high_hz }
    }
}

/// Scans an amplitude spectrum for the points where the magnitude drops
/// below `peak / sqrt(2)` on either side of the peak.
pub fn compute_corners(
    amplitudes: &[Complex64],
    frequencies: &[f64],
) -> ResponseResult<CornerFrequencies> {
    if amplitudes.len() != frequencies.len() {
        return Err(ResponseError::LengthMismatch {
            amplitude: amplitudes.len(),
            frequency: frequencies.len(),
        });
    }
    if amplitudes.is_empty() {
        return Err(ResponseError::invalid_response(
            "cannot locate corners in an empty spectrum",
        ));
    }

    let magnitudes: Vec<f64> = amplitudes
        .iter()
        .map(|amplitude| {
            let magnitude = amplitude.norm();
            if magnitude.is_finite() { magnitude } else { 0.0 }
        })
        .collect();

    let (peak_index, peak) = peak_magnitude(&magnitudes);
    let threshold = peak * FRAC_1_SQRT_2;
    let last = magnitudes.len() - 1;

    let low_hz = if peak_index == 0 {
        0.0
    } else {
        match (0..peak_index).rev().find(|&index| magnitudes[index] < threshold) {
            Some(index) => interpolate_crossing(
                threshold,
                (frequencies[index], magnitudes[index]),
                (frequencies[index + 1], magnitudes[index + 1]),
            ),
            None => frequencies[0],
        }
    };

    let high_hz = match (peak_index..=last).find(|&index| magnitudes[index] < threshold) {
        Some(index) => interpolate_crossing(
            threshold,
            (frequencies[index], magnitudes[index]),
            (frequencies[index - 1], magnitudes[index - 1]),
        ),
        None => frequencies[last],
    };

    Ok(CornerFrequencies { low_hz, high_hz })
}

fn peak_magnitude(magnitudes: &[f64]) -> (usize, f64) {
    let mut peak_index = 0;
    let mut peak = magnitudes[0];
    for (index, &magnitude) in magnitudes.iter().enumerate().skip(1) {
        if magnitude > peak {
            peak_index = index;
            peak = magnitude;
        }
    }
    (peak_index, peak)
}

/// `below` is the first sample under the threshold, `above` its neighbour
/// on the peak side.
fn interpolate_crossing(threshold: f64, below: (f64, f64), above: (f64, f64)) -> f64 {
    let (below_frequency, below_magnitude) = below;
    let (above_frequency, above_magnitude) = above;
    let rise = above_magnitude - below_magnitude;
    if rise == 0.0 {
        return below_frequency;
    }
    below_frequency + (threshold - below_magnitude) * (above_frequency - below_frequency) / rise
}
