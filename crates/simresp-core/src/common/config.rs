//! Reduction settings, optionally loaded from a JSON document.

use super::constants::{CORNER_CEILING_FRACTION, FREQUENCY_POINTS, GAIN_TOLERANCE};
use crate::domain::{ResponseError, ResponseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReductionConfig {
    pub gain_tolerance: f64,
    pub frequency_points: usize,
    pub corner_ceiling_fraction: f64,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            gain_tolerance: GAIN_TOLERANCE,
            frequency_points: FREQUENCY_POINTS,
            corner_ceiling_fraction: CORNER_CEILING_FRACTION,
        }
    }
}

impl ReductionConfig {
    pub fn validate(&self) -> ResponseResult<()> {
        if !self.gain_tolerance.is_finite() || self.gain_tolerance < 0.0 {
            return Err(ResponseError::InvalidConfig(format!(
                "gainTolerance must be finite and >= 0, got {}",
                self.gain_tolerance
            )));
        }
        if !self.frequency_points.is_power_of_two() {
            return Err(ResponseError::InvalidConfig(format!(
                "frequencyPoints must be a power of two, got {}",
                self.frequency_points
            )));
        }
        if !(self.corner_ceiling_fraction > 0.0 && self.corner_ceiling_fraction <= 0.5) {
            return Err(ResponseError::InvalidConfig(format!(
                "cornerCeilingFraction must be in (0, 0.5], got {}",
                self.corner_ceiling_fraction
            )));
        }
        Ok(())
    }
}

pub fn load_reduction_config(config_path: impl AsRef<Path>) -> ResponseResult<ReductionConfig> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ResponseError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: ReductionConfig =
        serde_json::from_str(&source).map_err(|source| ResponseError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
