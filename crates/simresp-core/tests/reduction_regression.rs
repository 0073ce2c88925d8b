use num_complex::Complex64;
use simresp_core::common::ReductionConfig;
use simresp_core::domain::{
    ChannelResponse, ClipLevel, InstrumentSensitivity, ResponseStage, SensorClass, StageKind,
};
use simresp_core::numerics::{compute_corners, natural_frequency_and_damping};
use simresp_core::pipeline::{ChannelStatus, load_inventory, reduce_channels};
use simresp_core::response::simple_response;
use std::f64::consts::PI;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn short_period_seismometer(stage_gain: f64, reference_gain: f64) -> ChannelResponse {
    ChannelResponse::new(
        vec![
            ResponseStage::poles_zeros(
                stage_gain,
                1.0,
                1.6,
                vec![
                    Complex64::new(-5.026548, 3.769911),
                    Complex64::new(-5.026548, -3.769911),
                ],
                vec![Complex64::new(0.0, 0.0); 2],
            ),
            ResponseStage::gain_only(StageKind::Coefficients, Some(1.0)),
        ],
        InstrumentSensitivity {
            reference_gain,
            reference_frequency: 1.0,
            input_units: "M/S".to_string(),
        },
    )
}

#[test]
fn seismometer_reduces_to_one_hertz_oscillator() {
    let outcome = simple_response(
        100.0,
        &short_period_seismometer(1500.0, 1500.0),
        &ReductionConfig::default(),
    )
    .expect("seismometer should reduce");
    let response = outcome.response;

    let pole_magnitude = Complex64::new(-5.026548, 3.769911).norm();
    assert!((response.natural_frequency - pole_magnitude / (2.0 * PI)).abs() < 1.0e-12);
    assert!((response.natural_frequency - 1.0).abs() < 1.0e-5);
    assert!((response.damping - 0.8).abs() < 1.0e-5);

    // Half-power point of a 1 Hz, 0.8-damped high-pass.
    let expected_low = ((0.56 + 4.3136_f64.sqrt()) / 2.0).sqrt();
    assert!((response.low_corner_hz - expected_low).abs() < 1.0e-2);
    assert_eq!(response.high_corner_hz, 40.0);
    assert_eq!(response.gain, 1500.0);
    assert_eq!(response.gain_units, "DU/M/S");
    assert!(outcome.advisories.is_empty());
}

#[test]
fn clamped_corners_stay_ordered_for_any_sample_rate() {
    let response = short_period_seismometer(1500.0, 1500.0);
    let config = ReductionConfig::default();

    for sample_rate in [0.5, 1.0, 2.5, 20.0, 100.0, 1000.0] {
        let outcome =
            simple_response(sample_rate, &response, &config).expect("seismometer should reduce");
        let reduced = outcome.response;
        assert!(reduced.high_corner_hz <= 0.4 * sample_rate + 1.0e-12);
        assert!(reduced.low_corner_hz <= reduced.high_corner_hz);
    }
}

#[test]
fn corner_detection_is_idempotent() {
    let frequencies: Vec<f64> = (0..=64).map(|index| f64::from(index) * 0.5).collect();
    let amplitudes: Vec<Complex64> = frequencies
        .iter()
        .map(|&frequency| {
            let x = frequency / 4.0;
            Complex64::new(x * x / ((1.0 - x * x).powi(2) + 1.96 * x * x).sqrt(), 0.0)
        })
        .collect();

    let first = compute_corners(&amplitudes, &frequencies).expect("corners should resolve");
    let second = compute_corners(&amplitudes, &frequencies).expect("corners should resolve");
    assert_eq!(first, second);
}

#[test]
fn oscillator_fallback_never_fails() {
    let real_poles = [Complex64::new(-1.0, 0.0), Complex64::new(-3.0, 0.0)];
    let estimate = natural_frequency_and_damping(&real_poles, 0.1, 10.0, SensorClass::Vel);
    assert_eq!(estimate.natural_frequency, 0.0);
    assert_eq!(estimate.damping, 0.0);
}

#[test]
fn inventory_fixture_reduces_with_partial_failure() {
    let inventory = load_inventory(fixture_path("inventory.json")).expect("fixture should load");
    let report = reduce_channels(&inventory.channels, &ReductionConfig::default())
        .expect("default config is valid");

    assert_eq!(report.summary.attempted, 3);
    assert_eq!(report.summary.reduced, 2);
    assert_eq!(report.summary.failed, 1);
    assert!(report.summary.has_failures());

    let seismometer = report.channels[0].reduction().expect("RATT should reduce");
    assert!((seismometer.response.natural_frequency - 1.0).abs() < 1.0e-5);
    match seismometer.clip_level {
        ClipLevel::Known(level) => assert!((level - 6.0e8 * 0.0125).abs() < 1.0e-3),
        ClipLevel::Unknown => panic!("STS2 behind a Q330 has a clip rule"),
    }

    let accelerometer = report.channels[1].reduction().expect("KEEL should reduce");
    assert!((accelerometer.response.natural_frequency - 50.0).abs() < 1.0e-2);
    assert!((accelerometer.response.damping - 0.7).abs() < 1.0e-4);
    assert!(accelerometer.response.high_corner_hz <= 80.0);
    assert_eq!(accelerometer.response.gain_units, "DU/M/S**2");
    let equipment = accelerometer.equipment.as_ref().expect("identifier parsed");
    assert_eq!(equipment.sensor_family, "ES_T");
    match accelerometer.clip_level {
        ClipLevel::Known(level) => {
            assert!((level - 1_048_575.0 * 4.0 * 9.8 * 0.5).abs() < 1.0e-3);
        }
        ClipLevel::Unknown => panic!("episensor behind a Q330 has a clip rule"),
    }

    assert_eq!(report.channels[2].seed_id, "UW.OLDY..EHZ");
    assert!(matches!(
        &report.channels[2].status,
        ChannelStatus::Failed { error } if error.code == "INPUT.INVALID_RESPONSE"
    ));
}
