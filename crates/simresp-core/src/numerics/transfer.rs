//! Analog poles/zeros transfer-function evaluation.
//!
//! `H(f) = scale * prod(jw - z_k) / prod(jw - p_k)` with `w = 2 pi f`, sampled
//! on an evenly spaced grid from DC to Nyquist.

use crate::domain::{ResponseError, ResponseResult};
use num_complex::Complex64;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolesZeros<'a> {
    pub poles: &'a [Complex64],
    pub zeros: &'a [Complex64],
}

impl<'a> PolesZeros<'a> {
    pub fn new(poles: &'a [Complex64], zeros: &'a [Complex64]) -> Self {
        Self { poles, zeros }
    }

    pub fn is_degenerate(&self) -> bool {
        self.poles.is_empty() && self.zeros.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponse {
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<Complex64>,
}

impl FrequencyResponse {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn nyquist(&self) -> Option<f64> {
        self.frequencies.last().copied()
    }
}

pub fn evaluate_transfer(paz: PolesZeros<'_>, scale: f64, frequency: f64) -> Complex64 {
    let s = Complex64::new(0.0, 2.0 * PI * frequency);
    let numerator = paz
        .zeros
        .iter()
        .fold(Complex64::new(scale, 0.0), |product, zero| product * (s - zero));
    let denominator = paz
        .poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |product, pole| product * (s - pole));
    numerator / denominator
}

/// Magnitude of the transfer function at a single frequency in Hz.
pub fn paz_amplitude_at(paz: PolesZeros<'_>, scale: f64, frequency: f64) -> f64 {
    evaluate_transfer(paz, scale, frequency).norm()
}

/// Samples `frequency_points + 1` frequencies from 0 to Nyquist inclusive.
pub fn paz_frequency_response(
    paz: PolesZeros<'_>,
    scale: f64,
    sample_interval: f64,
    frequency_points: usize,
) -> ResponseResult<FrequencyResponse> {
    if paz.is_degenerate() {
        return Err(ResponseError::invalid_response(
            "response has neither poles nor zeros",
        ));
    }
    if !sample_interval.is_finite() || sample_interval <= 0.0 {
        return Err(ResponseError::invalid_response(format!(
            "sample interval must be finite and > 0, got {sample_interval}"
        )));
    }
    if frequency_points == 0 {
        return Err(ResponseError::invalid_response(
            "frequency grid needs at least one point",
        ));
    }

    let nyquist = 1.0 / (2.0 * sample_interval);
    let step = nyquist / frequency_points as f64;
    let frequencies: Vec<f64> = (0..=frequency_points)
        .map(|index| index as f64 * step)
        .collect();
    let amplitudes = frequencies
        .iter()
        .map(|&frequency| evaluate_transfer(paz, scale, frequency))
        .collect();

    Ok(FrequencyResponse {
        frequencies,
        amplitudes,
    })
}
