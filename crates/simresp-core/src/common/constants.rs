/// Relative tolerance for normalized amplitudes and sensitivity cross-checks.
pub const GAIN_TOLERANCE: f64 = 5.0e-2;

/// Points on the DC..Nyquist grid used for corner detection.
pub const FREQUENCY_POINTS: usize = 2048;

/// High corners are limited to this fraction of the sample rate (80% of Nyquist).
pub const CORNER_CEILING_FRACTION: f64 = 0.4;

/// Standard gravity as used by the clip-level calibration table, in m/s^2.
pub const STANDARD_GRAVITY: f64 = 9.8;

/// Serial used when an identifier carries no serial number.
pub const PLACEHOLDER_SERIAL: &str = "XXXX";

/// Prefix of gain units, digital units per physical input unit.
pub const DIGITAL_UNITS_PREFIX: &str = "DU/";
