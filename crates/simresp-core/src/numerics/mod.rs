pub mod corners;
pub mod oscillator;
pub mod transfer;

pub use corners::{CornerFrequencies, compute_corners};
pub use oscillator::{
    OscillatorEstimate, conjugate_pair_candidates, natural_frequency_and_damping,
};
pub use transfer::{
    FrequencyResponse, PolesZeros, evaluate_transfer, paz_amplitude_at, paz_frequency_response,
};

/// `|actual - reference| / |reference|`; infinite when the reference is zero
/// or either value is not finite.
pub fn relative_deviation(actual: f64, reference: f64) -> f64 {
    if reference == 0.0 || !reference.is_finite() || !actual.is_finite() {
        return f64::INFINITY;
    }
    ((actual - reference) / reference).abs()
}

pub fn exceeds_tolerance(actual: f64, reference: f64, tolerance: f64) -> bool {
    relative_deviation(actual, reference) > tolerance
}
