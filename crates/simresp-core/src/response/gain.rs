use crate::domain::{Advisory, ChannelResponse, ResponseError, ResponseResult, StageKind};
use crate::numerics::{PolesZeros, exceeds_tolerance, paz_amplitude_at};
use num_complex::Complex64;
use tracing::{debug, warn};

/// Outcome of walking the stage cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct GainReconciliation {
    /// Product of the (possibly corrected) stage gains, as a magnitude.
    pub total_gain: f64,
    /// `1 / |H(reference_frequency)|` over the combined poles and zeros.
    pub normalization_factor: f64,
    pub poles: Vec<Complex64>,
    pub zeros: Vec<Complex64>,
    pub advisories: Vec<Advisory>,
}

impl GainReconciliation {
    pub fn poles_zeros(&self) -> PolesZeros<'_> {
        PolesZeros::new(&self.poles, &self.zeros)
    }
}

pub fn reconcile_gain(
    response: &ChannelResponse,
    tolerance: f64,
) -> ResponseResult<GainReconciliation> {
    let mut poles = Vec::new();
    let mut zeros = Vec::new();
    let mut advisories = Vec::new();
    let mut total_gain = 1.0;

    for (index, stage) in response.stages.iter().enumerate() {
        let stage_number = index + 1;
        let Some(nominal_gain) = stage.stage_gain else {
            debug!("stage {stage_number} ({}) declares no gain, skipped", stage.kind);
            continue;
        };

        let mut stage_gain = nominal_gain;
        if stage.carries_poles_zeros() {
            let normalization_frequency = match stage.normalization_frequency {
                Some(frequency) if frequency.is_finite() && frequency >= 0.0 => frequency,
                Some(frequency) => {
                    return Err(ResponseError::invalid_response(format!(
                        "stage {stage_number} normalization frequency must be finite and >= 0, got {frequency}"
                    )));
                }
                None => {
                    return Err(ResponseError::invalid_response(format!(
                        "stage {stage_number} carries poles and zeros but no normalization frequency"
                    )));
                }
            };
            poles.extend_from_slice(&stage.poles);
            zeros.extend_from_slice(&stage.zeros);

            let normalized_amplitude = paz_amplitude_at(
                PolesZeros::new(&stage.poles, &stage.zeros),
                stage.normalization_factor,
                normalization_frequency,
            );
            if (normalized_amplitude - 1.0).abs() > tolerance {
                stage_gain = normalized_amplitude * nominal_gain;
                let advisory = Advisory::StageGainCorrected {
                    stage: stage_number,
                    normalized_amplitude,
                    nominal_gain,
                    corrected_gain: stage_gain,
                };
                warn!("{advisory}");
                advisories.push(advisory);
            }
        } else if stage.kind == StageKind::Polynomial {
            debug!("stage {stage_number} is polynomial, using its scalar gain only");
        }

        total_gain *= stage_gain;
    }

    let sensitivity = &response.instrument_sensitivity;
    if exceeds_tolerance(total_gain, sensitivity.reference_gain, tolerance) {
        let advisory = Advisory::SensitivityMismatch {
            reported: sensitivity.reference_gain,
            calculated: total_gain,
        };
        warn!("{advisory}");
        advisories.push(advisory);
    }

    if total_gain == 0.0 || !total_gain.is_finite() {
        return Err(ResponseError::invalid_response(format!(
            "total gain across stages must be finite and non-zero, got {total_gain}"
        )));
    }
    if total_gain < 0.0 {
        let advisory = Advisory::NegativeTotalGain {
            calculated: total_gain,
        };
        warn!("{advisory}");
        advisories.push(advisory);
        total_gain = total_gain.abs();
    }

    let calculated_amplitude = paz_amplitude_at(
        PolesZeros::new(&poles, &zeros),
        1.0,
        sensitivity.reference_frequency,
    );
    if calculated_amplitude == 0.0 || !calculated_amplitude.is_finite() {
        return Err(ResponseError::invalid_response(format!(
            "poles and zeros evaluate to {calculated_amplitude} at the reference frequency {} Hz",
            sensitivity.reference_frequency
        )));
    }

    Ok(GainReconciliation {
        total_gain,
        normalization_factor: 1.0 / calculated_amplitude,
        poles,
        zeros,
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::reconcile_gain;
    use crate::domain::{
        Advisory, ChannelResponse, InstrumentSensitivity, ResponseError, ResponseStage, StageKind,
    };
    use num_complex::Complex64;

    fn seismometer_stage(stage_gain: f64, normalization_factor: f64) -> ResponseStage {
        ResponseStage::poles_zeros(
            stage_gain,
            1.0,
            normalization_factor,
            vec![
                Complex64::new(-5.026548, 3.769911),
                Complex64::new(-5.026548, -3.769911),
            ],
            vec![Complex64::new(0.0, 0.0); 2],
        )
    }

    fn sensitivity(reference_gain: f64) -> InstrumentSensitivity {
        InstrumentSensitivity {
            reference_gain,
            reference_frequency: 1.0,
            input_units: "M/S".to_string(),
        }
    }

    #[test]
    fn normalized_single_stage_keeps_nominal_gain() {
        let response = ChannelResponse::new(vec![seismometer_stage(300.0, 1.6)], sensitivity(300.0));

        let reconciliation = reconcile_gain(&response, 0.05).expect("gain should reconcile");
        assert_eq!(reconciliation.total_gain, 300.0);
        assert!(reconciliation.advisories.is_empty());
        assert!((reconciliation.normalization_factor - 1.6).abs() < 1.0e-6);
        assert_eq!(reconciliation.poles.len(), 2);
        assert_eq!(reconciliation.zeros.len(), 2);
    }

    #[test]
    fn cascade_multiplies_stage_gains_in_order() {
        let response = ChannelResponse::new(
            vec![
                seismometer_stage(300.0, 1.6),
                ResponseStage::gain_only(StageKind::Coefficients, Some(419_430.0)),
                ResponseStage::gain_only(StageKind::Fir, Some(1.0)),
                ResponseStage::gain_only(StageKind::Polynomial, None),
            ],
            sensitivity(300.0 * 419_430.0),
        );

        let reconciliation = reconcile_gain(&response, 0.05).expect("gain should reconcile");
        assert_eq!(reconciliation.total_gain, 300.0 * 419_430.0);
        assert!(reconciliation.advisories.is_empty());
    }

    #[test]
    fn mis_normalized_stage_gain_is_corrected() {
        let response = ChannelResponse::new(vec![seismometer_stage(300.0, 3.2)], sensitivity(300.0));

        let reconciliation = reconcile_gain(&response, 0.05).expect("gain should reconcile");
        assert!((reconciliation.total_gain - 600.0).abs() < 1.0e-3);
        assert!(matches!(
            reconciliation.advisories[0],
            Advisory::StageGainCorrected { stage: 1, .. }
        ));
        assert!(matches!(
            reconciliation.advisories[1],
            Advisory::SensitivityMismatch { reported, .. } if reported == 300.0
        ));
    }

    #[test]
    fn negative_total_gain_is_reported_by_magnitude() {
        let response =
            ChannelResponse::new(vec![seismometer_stage(-300.0, 1.6)], sensitivity(-300.0));

        let reconciliation = reconcile_gain(&response, 0.05).expect("gain should reconcile");
        assert_eq!(reconciliation.total_gain, 300.0);
        assert_eq!(
            reconciliation.advisories,
            vec![Advisory::NegativeTotalGain { calculated: -300.0 }]
        );
    }

    #[test]
    fn poles_zeros_stage_requires_normalization_frequency() {
        let stage: ResponseStage = serde_json::from_str(
            r#"{
                "kind": "polesZeros",
                "stageGain": 300.0,
                "normalizationFactor": 1.6,
                "poles": [[-5.026548, 3.769911], [-5.026548, -3.769911]],
                "zeros": [[0.0, 0.0], [0.0, 0.0]]
            }"#,
        )
        .expect("stage should deserialize");
        assert_eq!(stage.normalization_frequency, None);

        let response = ChannelResponse::new(vec![stage], sensitivity(300.0));
        match reconcile_gain(&response, 0.05) {
            Err(ResponseError::InvalidResponse(message)) => {
                assert!(message.contains("stage 1"), "{message}");
                assert!(message.contains("no normalization frequency"), "{message}");
            }
            other => panic!("expected invalid response, got {other:?}"),
        }

        let mut stage = seismometer_stage(300.0, 1.6);
        stage.normalization_frequency = Some(f64::NAN);
        assert!(matches!(
            reconcile_gain(&ChannelResponse::new(vec![stage], sensitivity(300.0)), 0.05),
            Err(ResponseError::InvalidResponse(_))
        ));
    }

    #[test]
    fn zero_gain_is_invalid() {
        let response = ChannelResponse::new(vec![seismometer_stage(0.0, 1.6)], sensitivity(300.0));
        assert!(matches!(
            reconcile_gain(&response, 0.05),
            Err(ResponseError::InvalidResponse(_))
        ));
    }
}
