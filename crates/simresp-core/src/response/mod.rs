//! Reduction of a full stage cascade to a single-degree-of-freedom response.

pub mod gain;

pub use gain::{GainReconciliation, reconcile_gain};

use crate::common::ReductionConfig;
use crate::common::constants::DIGITAL_UNITS_PREFIX;
use crate::domain::{Advisory, ChannelResponse, ResponseError, ResponseResult, SimplifiedResponse};
use crate::numerics::{compute_corners, natural_frequency_and_damping, paz_frequency_response};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleResponseOutcome {
    pub response: SimplifiedResponse,
    pub advisories: Vec<Advisory>,
}

/// Natural frequency, damping, passband corners and overall gain of one
/// channel response sampled at `sample_rate` Hz.
pub fn simple_response(
    sample_rate: f64,
    response: &ChannelResponse,
    config: &ReductionConfig,
) -> ResponseResult<SimpleResponseOutcome> {
    config.validate()?;
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ResponseError::invalid_response(format!(
            "sample rate must be finite and > 0, got {sample_rate}"
        )));
    }

    let reconciliation = reconcile_gain(response, config.gain_tolerance)?;
    let mut advisories = reconciliation.advisories.clone();

    let spectrum = paz_frequency_response(
        reconciliation.poles_zeros(),
        reconciliation.normalization_factor,
        1.0 / sample_rate,
        config.frequency_points,
    )?;

    debug!("determining frequency corners");
    let corners = compute_corners(&spectrum.amplitudes, &spectrum.frequencies)?;
    debug!("low corner: {} Hz, high corner: {} Hz", corners.low_hz, corners.high_hz);

    let sensor_class = response.sensor_class();
    let oscillator = natural_frequency_and_damping(
        &reconciliation.poles,
        corners.low_hz,
        corners.high_hz,
        sensor_class,
    );
    if !oscillator.is_available() {
        let advisory = Advisory::NoConjugatePolePair;
        warn!("{advisory}");
        advisories.push(advisory);
    }
    debug!(
        "natural frequency: {} Hz, damping: {}",
        oscillator.natural_frequency, oscillator.damping
    );

    let corners = corners.clamped(sample_rate, config.corner_ceiling_fraction);

    Ok(SimpleResponseOutcome {
        response: SimplifiedResponse {
            natural_frequency: oscillator.natural_frequency,
            damping: oscillator.damping,
            low_corner_hz: corners.low_hz,
            high_corner_hz: corners.high_hz,
            gain: reconciliation.total_gain,
            gain_units: format!(
                "{DIGITAL_UNITS_PREFIX}{}",
                response.instrument_sensitivity.input_units.trim()
            ),
        },
        advisories,
    })
}
