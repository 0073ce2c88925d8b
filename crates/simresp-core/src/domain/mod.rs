pub mod errors;

pub use errors::{ErrorCategory, ParserResult, ResponseError, ResponseResult};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    #[default]
    Serial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageKind {
    PolesZeros,
    Coefficients,
    Fir,
    Polynomial,
    #[default]
    GainOnly,
}

impl StageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PolesZeros => "POLES_ZEROS",
            Self::Coefficients => "COEFFICIENTS",
            Self::Fir => "FIR",
            Self::Polynomial => "POLYNOMIAL",
            Self::GainOnly => "GAIN_ONLY",
        }
    }
}

impl Display for StageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One element of an instrument cascade as delivered by the metadata inventory.
///
/// Only [`StageKind::PolesZeros`] stages contribute poles and zeros to the
/// combined transfer function; every other kind contributes its scalar gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStage {
    #[serde(default)]
    pub kind: StageKind,
    #[serde(default)]
    pub stage_gain: Option<f64>,
    /// Required for pole/zero stages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization_frequency: Option<f64>,
    #[serde(default = "unit_normalization_factor")]
    pub normalization_factor: f64,
    #[serde(default)]
    pub poles: Vec<Complex64>,
    #[serde(default)]
    pub zeros: Vec<Complex64>,
}

fn unit_normalization_factor() -> f64 {
    1.0
}

impl ResponseStage {
    pub fn poles_zeros(
        stage_gain: f64,
        normalization_frequency: f64,
        normalization_factor: f64,
        poles: Vec<Complex64>,
        zeros: Vec<Complex64>,
    ) -> Self {
        Self {
            kind: StageKind::PolesZeros,
            stage_gain: Some(stage_gain),
            normalization_frequency: Some(normalization_frequency),
            normalization_factor,
            poles,
            zeros,
        }
    }

    pub fn gain_only(kind: StageKind, stage_gain: Option<f64>) -> Self {
        Self {
            kind,
            stage_gain,
            normalization_frequency: None,
            normalization_factor: 1.0,
            poles: Vec::new(),
            zeros: Vec::new(),
        }
    }

    pub fn carries_poles_zeros(&self) -> bool {
        self.kind == StageKind::PolesZeros
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSensitivity {
    pub reference_gain: f64,
    pub reference_frequency: f64,
    pub input_units: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub stages: Vec<ResponseStage>,
    pub instrument_sensitivity: InstrumentSensitivity,
}

impl ChannelResponse {
    pub fn new(stages: Vec<ResponseStage>, instrument_sensitivity: InstrumentSensitivity) -> Self {
        Self {
            stages,
            instrument_sensitivity,
        }
    }

    pub fn sensor_class(&self) -> SensorClass {
        SensorClass::from_input_units(&self.instrument_sensitivity.input_units)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorClass {
    Vel,
    Acc,
}

impl SensorClass {
    /// Displacement and velocity transducers are both treated as `VEL`.
    pub fn from_input_units(units: &str) -> Self {
        let normalized = units.trim();
        if normalized.eq_ignore_ascii_case("M/S") || normalized.eq_ignore_ascii_case("M") {
            Self::Vel
        } else {
            Self::Acc
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vel => "VEL",
            Self::Acc => "ACC",
        }
    }
}

impl Display for SensorClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// SEED channel code split into band, instrument and orientation characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelCode {
    pub band: char,
    pub instrument: char,
    pub orientation: char,
}

impl FromStr for ChannelCode {
    type Err = ResponseError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let trimmed = code.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(band), Some(instrument), Some(orientation), None) => Ok(Self {
                band: band.to_ascii_uppercase(),
                instrument: instrument.to_ascii_uppercase(),
                orientation: orientation.to_ascii_uppercase(),
            }),
            _ => Err(ResponseError::invalid_response(format!(
                "channel code '{trimmed}' must have exactly 3 characters"
            ))),
        }
    }
}

impl TryFrom<String> for ChannelCode {
    type Error = ResponseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelCode> for String {
    fn from(code: ChannelCode) -> Self {
        code.to_string()
    }
}

impl Display for ChannelCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.band, self.instrument, self.orientation)
    }
}

/// Everything the metadata inventory hands over for one channel epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRequest {
    pub network: String,
    pub station: String,
    #[serde(default)]
    pub location: String,
    pub channel: ChannelCode,
    pub sample_rate: f64,
    #[serde(default)]
    pub equipment: Option<String>,
    pub response: ChannelResponse,
}

impl ChannelRequest {
    pub fn seed_id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedResponse {
    pub natural_frequency: f64,
    pub damping: f64,
    pub low_corner_hz: f64,
    pub high_corner_hz: f64,
    pub gain: f64,
    pub gain_units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentIdentifier {
    pub sensor_family: String,
    pub sensor_serial: String,
    pub logger_family: Option<String>,
    pub logger_serial: Option<String>,
}

impl EquipmentIdentifier {
    pub fn new(
        sensor_family: impl Into<String>,
        sensor_serial: impl Into<String>,
        logger_family: Option<String>,
        logger_serial: Option<String>,
    ) -> Self {
        Self {
            sensor_family: sensor_family.into(),
            sensor_serial: sensor_serial.into(),
            logger_family,
            logger_serial,
        }
    }

    pub fn has_logger(&self) -> bool {
        self.logger_family
            .as_deref()
            .is_some_and(|family| !family.trim().is_empty())
    }
}

impl Display for EquipmentIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.sensor_family, self.sensor_serial)?;
        if let Some(logger) = &self.logger_family {
            write!(
                f,
                "={}-{}",
                logger,
                self.logger_serial.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}

pub const UNKNOWN_CLIP_LEVEL: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum ClipLevel {
    Known(f64),
    Unknown,
}

impl ClipLevel {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Known(level) => level,
            Self::Unknown => UNKNOWN_CLIP_LEVEL,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl From<f64> for ClipLevel {
    fn from(value: f64) -> Self {
        if value < 0.0 || !value.is_finite() {
            Self::Unknown
        } else {
            Self::Known(value)
        }
    }
}

impl From<ClipLevel> for f64 {
    fn from(level: ClipLevel) -> Self {
        level.as_f64()
    }
}

/// Recoverable findings reported alongside a reduction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advisory {
    #[serde(rename_all = "camelCase")]
    StageGainCorrected {
        stage: usize,
        normalized_amplitude: f64,
        nominal_gain: f64,
        corrected_gain: f64,
    },
    #[serde(rename_all = "camelCase")]
    SensitivityMismatch { reported: f64, calculated: f64 },
    #[serde(rename_all = "camelCase")]
    NegativeTotalGain { calculated: f64 },
    NoConjugatePolePair,
    #[serde(rename_all = "camelCase")]
    UnknownClipRule {
        channel: String,
        sensor: String,
        logger: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UnparseableIdentifier { identifier: String, reason: String },
    MissingIdentifier,
}

impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StageGainCorrected {
                stage,
                normalized_amplitude,
                nominal_gain,
                corrected_gain,
            } => write!(
                f,
                "stage {stage}: normalized amplitude at normalization frequency is {normalized_amplitude}, i.e. {:6.3}% from 1, using calculated gain {corrected_gain:.2} instead of {nominal_gain:.2}",
                100.0 * (normalized_amplitude - 1.0)
            ),
            Self::SensitivityMismatch {
                reported,
                calculated,
            } => write!(
                f,
                "reported sensitivity {reported:.2} differs from calculated sensitivity {calculated:.2}"
            ),
            Self::NegativeTotalGain { calculated } => write!(
                f,
                "calculated total gain {calculated:.2} is negative, reporting its magnitude"
            ),
            Self::NoConjugatePolePair => f.write_str(
                "no complex-conjugate pole pair found, natural frequency and damping set to 0",
            ),
            Self::UnknownClipRule {
                channel,
                sensor,
                logger,
            } => write!(
                f,
                "no clip rule for {channel}: sensor '{sensor}', logger '{}'",
                logger.as_deref().unwrap_or("-")
            ),
            Self::UnparseableIdentifier { identifier, reason } => {
                write!(f, "equipment identifier '{identifier}' not parsed: {reason}")
            }
            Self::MissingIdentifier => f.write_str("no equipment identifier, clip level unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReduction {
    pub response: SimplifiedResponse,
    pub clip_level: ClipLevel,
    pub equipment: Option<EquipmentIdentifier>,
    pub advisories: Vec<Advisory>,
}

#[cfg(test)]
mod tests {
    use super::{
        Advisory, ChannelCode, ClipLevel, EquipmentIdentifier, ResponseStage, SensorClass,
        StageKind,
    };

    #[test]
    fn sensor_class_follows_input_units() {
        assert_eq!(SensorClass::from_input_units("M/S"), SensorClass::Vel);
        assert_eq!(SensorClass::from_input_units(" m/s "), SensorClass::Vel);
        assert_eq!(SensorClass::from_input_units("M"), SensorClass::Vel);
        assert_eq!(SensorClass::from_input_units("M/S**2"), SensorClass::Acc);
        assert_eq!(SensorClass::from_input_units("V"), SensorClass::Acc);
    }

    #[test]
    fn channel_code_parses_three_characters() {
        let code: ChannelCode = "hnz".parse().expect("channel code should parse");
        assert_eq!(code.band, 'H');
        assert_eq!(code.instrument, 'N');
        assert_eq!(code.orientation, 'Z');
        assert_eq!(code.to_string(), "HNZ");
        assert!("HN".parse::<ChannelCode>().is_err());
        assert!("HNZ1".parse::<ChannelCode>().is_err());
    }

    #[test]
    fn clip_level_uses_negative_sentinel_for_unknown() {
        assert_eq!(ClipLevel::Unknown.as_f64(), -1.0);
        assert_eq!(ClipLevel::from(-1.0), ClipLevel::Unknown);
        assert_eq!(ClipLevel::from(2048.0), ClipLevel::Known(2048.0));
        assert!(!ClipLevel::from(f64::NAN).is_known());

        let encoded = serde_json::to_string(&ClipLevel::Unknown).expect("clip level encodes");
        assert_eq!(encoded, "-1.0");
    }

    #[test]
    fn stage_json_defaults_to_gain_only() {
        let stage: ResponseStage =
            serde_json::from_str(r#"{ "stageGain": 419430.0 }"#).expect("stage should parse");
        assert_eq!(stage.kind, StageKind::GainOnly);
        assert_eq!(stage.normalization_factor, 1.0);
        assert!(!stage.carries_poles_zeros());
    }

    #[test]
    fn poles_deserialize_from_pairs() {
        let stage: ResponseStage = serde_json::from_str(
            r#"{ "kind": "polesZeros", "stageGain": 2.0, "poles": [[-1.0, 2.0]], "zeros": [[0.0, 0.0]] }"#,
        )
        .expect("stage should parse");
        assert!(stage.carries_poles_zeros());
        assert_eq!(stage.poles[0].re, -1.0);
        assert_eq!(stage.poles[0].im, 2.0);
    }

    #[test]
    fn identifier_reports_logger_presence() {
        let with_logger = EquipmentIdentifier::new(
            "ES_T",
            "1234",
            Some("K2".to_string()),
            Some("5678".to_string()),
        );
        assert!(with_logger.has_logger());
        assert_eq!(with_logger.to_string(), "ES_T-1234=K2-5678");

        let sensor_only = EquipmentIdentifier::new("STS-2", "XXXX", Some("  ".to_string()), None);
        assert!(!sensor_only.has_logger());
    }

    #[test]
    fn advisories_render_readable_text() {
        let advisory = Advisory::SensitivityMismatch {
            reported: 100.0,
            calculated: 120.0,
        };
        assert_eq!(
            advisory.to_string(),
            "reported sensitivity 100.00 differs from calculated sensitivity 120.00"
        );
    }
}
