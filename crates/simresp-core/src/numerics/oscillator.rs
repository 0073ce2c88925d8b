use crate::domain::SensorClass;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

/// Single-degree-of-freedom oscillator parameters derived from a pole pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorEstimate {
    pub natural_frequency: f64,
    pub damping: f64,
}

impl OscillatorEstimate {
    /// No conjugate pole pair, so no oscillator model.
    pub const UNAVAILABLE: Self = Self {
        natural_frequency: 0.0,
        damping: 0.0,
    };

    pub fn from_pole(pole: Complex64) -> Self {
        let omega = pole.norm();
        Self {
            natural_frequency: omega / (2.0 * PI),
            damping: -pole.re / omega,
        }
    }

    pub fn is_available(&self) -> bool {
        *self != Self::UNAVAILABLE
    }
}

fn is_conjugate_pair(first: Complex64, second: Complex64) -> bool {
    first.re == second.re && first.im == -second.im && first.re != 0.0
}

/// One candidate per qualifying unordered pole pair, in discovery order.
pub fn conjugate_pair_candidates(poles: &[Complex64]) -> Vec<OscillatorEstimate> {
    let mut candidates = Vec::new();
    for (index, &first) in poles.iter().enumerate() {
        for &second in &poles[index + 1..] {
            if is_conjugate_pair(first, second) {
                let candidate = OscillatorEstimate::from_pole(first);
                debug!(
                    "candidate conjugate poles {first} and {second}: fs={}, damping={}",
                    candidate.natural_frequency, candidate.damping
                );
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Velocity sensors match the candidate nearest the low corner, everything
/// else the candidate nearest the high corner. Ties keep the first found.
pub fn natural_frequency_and_damping(
    poles: &[Complex64],
    low_corner_hz: f64,
    high_corner_hz: f64,
    sensor_class: SensorClass,
) -> OscillatorEstimate {
    let target = match sensor_class {
        SensorClass::Vel => low_corner_hz,
        SensorClass::Acc => high_corner_hz,
    };
    debug!("selecting oscillator for {sensor_class} sensor near {target} Hz");

    let mut best: Option<(f64, OscillatorEstimate)> = None;
    for candidate in conjugate_pair_candidates(poles) {
        let distance = (candidate.natural_frequency - target).abs();
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, candidate));
        }
    }

    best.map_or(OscillatorEstimate::UNAVAILABLE, |(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::{OscillatorEstimate, conjugate_pair_candidates, natural_frequency_and_damping};
    use crate::domain::SensorClass;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    #[test]
    fn single_pair_reports_pole_magnitude_and_angle() {
        let pole = Complex64::new(-5.026548, 3.769911);
        let poles = [pole, pole.conj()];

        let estimate = natural_frequency_and_damping(&poles, 1.1, 40.0, SensorClass::Vel);
        assert!((estimate.natural_frequency - pole.norm() / (2.0 * PI)).abs() < 1.0e-12);
        assert!((estimate.damping - 5.026548 / pole.norm()).abs() < 1.0e-12);
        assert!((estimate.damping - 0.8).abs() < 1.0e-6);
    }

    #[test]
    fn real_or_imaginary_only_poles_yield_no_model() {
        let poles = [
            Complex64::new(-0.037, 0.0),
            Complex64::new(-0.05, 0.0),
            Complex64::new(0.0, 5.0),
            Complex64::new(0.0, -5.0),
            Complex64::new(-3.0, 1.0),
            Complex64::new(-3.1, -1.0),
        ];
        assert!(conjugate_pair_candidates(&poles).is_empty());

        let estimate = natural_frequency_and_damping(&poles, 0.1, 20.0, SensorClass::Acc);
        assert_eq!(estimate, OscillatorEstimate::UNAVAILABLE);
        assert!(!estimate.is_available());
        assert_eq!(
            natural_frequency_and_damping(&[], 0.1, 20.0, SensorClass::Vel),
            OscillatorEstimate::UNAVAILABLE
        );
    }

    #[test]
    fn repeated_real_poles_count_as_critically_damped_pair() {
        let pole = Complex64::new(-0.037, 0.0);
        let candidates = conjugate_pair_candidates(&[pole, pole]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].damping, 1.0);
        assert!((candidates[0].natural_frequency - 0.037 / (2.0 * PI)).abs() < 1.0e-15);
    }

    #[test]
    fn sensor_class_picks_the_matching_corner() {
        // Broadband pair near 0.0083 Hz and an anti-alias pair near 50 Hz.
        let long_period = Complex64::new(-0.037, 0.037);
        let anti_alias = Complex64::new(-222.0, 222.0);
        let poles = [long_period, long_period.conj(), anti_alias, anti_alias.conj()];

        let velocity = natural_frequency_and_damping(&poles, 0.008, 45.0, SensorClass::Vel);
        assert!((velocity.natural_frequency - long_period.norm() / (2.0 * PI)).abs() < 1.0e-12);

        let acceleration = natural_frequency_and_damping(&poles, 0.008, 45.0, SensorClass::Acc);
        assert!((acceleration.natural_frequency - anti_alias.norm() / (2.0 * PI)).abs() < 1.0e-12);
    }

    #[test]
    fn ties_keep_first_found_candidate() {
        let first = Complex64::new(-2.0 * PI * 0.5, 2.0 * PI * 0.5 * 3.0_f64.sqrt());
        let second = Complex64::new(-2.0 * PI * 0.9, 2.0 * PI * 0.4358898943540674);
        let poles = [first, first.conj(), second, second.conj()];

        let candidates = conjugate_pair_candidates(&poles);
        assert_eq!(candidates.len(), 2);
        let target = candidates[0].natural_frequency;

        let estimate = natural_frequency_and_damping(&poles, target, target, SensorClass::Vel);
        assert_eq!(estimate, candidates[0]);
    }
}
