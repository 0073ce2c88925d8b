//! Clip-level lookup for sensor/logger pairs.
//!
//! The tables are ordered; the first matching entry decides the level.
//! Patterns are uppercase substrings of the uppercased equipment families.

use crate::common::constants::STANDARD_GRAVITY;
use crate::domain::{ClipLevel, EquipmentIdentifier};
use tracing::debug;

/// Bumped whenever an entry in either table changes.
pub const CLIP_RULES_VERSION: &str = "2024.1";

/// How a rule turns the channel gain into counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelRule {
    /// Full scale at `n` times standard gravity.
    Gravity(f64),
    /// Full scale at a ground velocity in m/s.
    Velocity(f64),
    /// Velocity full scale limited by a digitizer count ceiling.
    VelocityCapped { velocity: f64, ceiling: f64 },
    /// Level independent of gain.
    Fixed(f64),
}

impl LevelRule {
    pub fn apply(self, gain: f64) -> f64 {
        match self {
            Self::Gravity(multiple) => gain * multiple * STANDARD_GRAVITY,
            Self::Velocity(velocity) => gain * velocity,
            Self::VelocityCapped { velocity, ceiling } => (gain * velocity).min(ceiling),
            Self::Fixed(level) => level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialField {
    Sensor,
    Logger,
}

/// Multiplies the level for specific units known to be configured differently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SerialOverride {
    pub field: SerialField,
    pub serials: &'static [&'static str],
    pub factor: f64,
}

impl SerialOverride {
    fn applies_to(&self, equipment: &EquipmentIdentifier) -> bool {
        let serial = match self.field {
            SerialField::Sensor => Some(equipment.sensor_serial.as_str()),
            SerialField::Logger => equipment.logger_serial.as_deref(),
        };
        serial.is_some_and(|serial| {
            let serial = serial.trim();
            self.serials.iter().any(|candidate| *candidate == serial)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorRule {
    pub sensors: &'static [&'static str],
    pub level: LevelRule,
    pub serial_override: Option<SerialOverride>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoggerAction {
    Uniform {
        level: LevelRule,
        serial_override: Option<SerialOverride>,
    },
    BySensor(&'static [SensorRule]),
    /// Fixed count ceilings chosen by a token inside the logger family.
    ByLoggerToken {
        token: &'static str,
        matched: f64,
        otherwise: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggerRule {
    pub label: &'static str,
    pub loggers: &'static [&'static str],
    /// Sensor families that select this rule regardless of the logger.
    pub sensors: &'static [&'static str],
    pub action: LoggerAction,
}

const fn sensor(sensors: &'static [&'static str], level: LevelRule) -> SensorRule {
    SensorRule {
        sensors,
        level,
        serial_override: None,
    }
}

const fn uniform(level: LevelRule) -> LoggerAction {
    LoggerAction::Uniform {
        level,
        serial_override: None,
    }
}

const SHORT_PERIOD: &[&str] = &["L4", "L4C", "S13", "L-4C", "S-13"];
const TRILLIUM_COMPACT_PH: &[&str] = &["TRCOM", "TRILLIUM COMPACT PH"];

const IDS_SENSORS: &[SensorRule] = &[
    sensor(&["320"], LevelRule::Gravity(2.0)),
    sensor(&["G40T_60", "CMG-40T"], LevelRule::Velocity(0.0125)),
    sensor(&["PMD"], LevelRule::Velocity(0.0065)),
];

const CENTAUR_SENSORS: &[SensorRule] = &[
    sensor(&["TITAN"], LevelRule::Gravity(4.0)),
    sensor(TRILLIUM_COMPACT_PH, LevelRule::Velocity(0.026)),
];

const K2_SENSORS: &[SensorRule] = &[
    SensorRule {
        sensors: &["ES", "SBEPI", "FBA23", "EPISENSOR", "FBA-23"],
        level: LevelRule::Gravity(2.0),
        serial_override: Some(SerialOverride {
            field: SerialField::Logger,
            serials: &["2147"],
            factor: 2.0,
        }),
    },
    sensor(SHORT_PERIOD, LevelRule::Velocity(0.0001)),
    sensor(&["GEDU", "CMG-EDU"], LevelRule::Velocity(0.00417)),
    sensor(&["PMD"], LevelRule::Velocity(0.0065)),
];

const ROCK_SENSORS: &[SensorRule] = &[
    SensorRule {
        sensors: &["ES"],
        level: LevelRule::Gravity(4.0),
        serial_override: Some(SerialOverride {
            field: SerialField::Logger,
            serials: &["1597", "1598", "1599", "1600", "1601"],
            factor: 0.5,
        }),
    },
    sensor(SHORT_PERIOD, LevelRule::Velocity(0.0001)),
];

const REFTEK_72A_SENSORS: &[SensorRule] = &[
    sensor(&["ES", "EPISENSOR"], LevelRule::Gravity(2.0)),
    sensor(&["FBA"], LevelRule::Gravity(1.0)),
    sensor(&["L22"], LevelRule::Velocity(0.0001)),
    sensor(&["G40T_60", "CMG-40T", "CMG40T"], LevelRule::Fixed(0.0125)),
    sensor(&["G3TNSN", "CMG-3T/NSN"], LevelRule::Fixed(0.0067)),
    sensor(&["G3T", "CMG-3T", "GT3134"], LevelRule::Fixed(0.0067)),
];

const Q330_SENSORS: &[SensorRule] = &[
    SensorRule {
        sensors: &["ES", "EPISENSOR"],
        level: LevelRule::Gravity(4.0),
        serial_override: Some(SerialOverride {
            field: SerialField::Sensor,
            serials: &[
                "3818", "3823", "3824", "3825", "3826", "3829", "3831", "3832", "3833", "3834",
                "3838", "3841", "4588", "4590", "7272",
            ],
            factor: 0.5,
        }),
    },
    sensor(&["STS2", "STS-2"], LevelRule::Velocity(0.0125)),
    sensor(&["G3T", "CMG-3T"], LevelRule::Velocity(0.0067)),
    sensor(&["TR240", "TRILLIUM 240"], LevelRule::Velocity(0.0166)),
    sensor(&["TR120", "TRILLIUM 120", "T120PH", "T120PA"], LevelRule::Velocity(0.0166)),
    sensor(TRILLIUM_COMPACT_PH, LevelRule::Velocity(0.026)),
];

const REFTEK_130_SENSORS: &[SensorRule] = &[
    sensor(&["ES", "147"], LevelRule::Gravity(4.0)),
    sensor(&["L22"], LevelRule::Velocity(0.0001)),
    sensor(&["TRCOM", "TRILLIUM COMPACT"], LevelRule::Velocity(0.026)),
    sensor(&["TR120", "TRILLIUM 120", "TRIL"], LevelRule::Velocity(0.0166)),
    sensor(&["G3ESP", "CMG-3ESP"], LevelRule::Velocity(0.005)),
    sensor(&["GT3134", "CMG-3T"], LevelRule::Velocity(0.0067)),
];

const SMART_SENSORS: &[SensorRule] = &[sensor(&["HS1"], LevelRule::Velocity(0.0001))];

pub static LOGGER_RULES: &[LoggerRule] = &[
    LoggerRule {
        label: "earthworm NI",
        loggers: &["WRM", "GUSAN", "RALPH", "ANALOG", "EARTHWORM NI", "LEGACY"],
        sensors: &[],
        action: uniform(LevelRule::Fixed(2048.0)),
    },
    LoggerRule {
        label: "PSN",
        loggers: &["PSN"],
        sensors: &[],
        action: LoggerAction::ByLoggerToken {
            token: "RV",
            matched: 8192.0,
            otherwise: 16384.0,
        },
    },
    LoggerRule {
        label: "Gener",
        loggers: &["GENER"],
        sensors: &[],
        action: uniform(LevelRule::Velocity(0.0065)),
    },
    LoggerRule {
        label: "Cascades-16S",
        loggers: &["C16S", "CASCADES-16S"],
        sensors: &[],
        action: uniform(LevelRule::VelocityCapped {
            velocity: 0.0001,
            ceiling: 32768.0,
        }),
    },
    LoggerRule {
        label: "NetQuakes",
        loggers: &["NQ", "NETQUAKE"],
        sensors: &[],
        action: uniform(LevelRule::Gravity(3.0)),
    },
    LoggerRule {
        label: "IDS",
        loggers: &["IDS"],
        sensors: &[],
        action: LoggerAction::BySensor(IDS_SENSORS),
    },
    LoggerRule {
        label: "CMG-5TD",
        loggers: &["G5TD"],
        sensors: &["CMG-5TD"],
        action: LoggerAction::Uniform {
            level: LevelRule::Gravity(4.0),
            serial_override: Some(SerialOverride {
                field: SerialField::Logger,
                serials: &["D838", "D833", "D820", "D826", "D817", "D825", "D810"],
                factor: 2.0,
            }),
        },
    },
    LoggerRule {
        label: "CMG-6TD",
        loggers: &["G6TD"],
        sensors: &["CMG-6T"],
        action: uniform(LevelRule::Velocity(0.00417)),
    },
    LoggerRule {
        label: "CMG-EDU",
        loggers: &["GEDU"],
        sensors: &["CMG-EDU"],
        action: uniform(LevelRule::Velocity(0.00417)),
    },
    LoggerRule {
        label: "Titan SMA",
        loggers: &["TITAN"],
        sensors: &[],
        action: uniform(LevelRule::Gravity(4.0)),
    },
    LoggerRule {
        label: "Centaur",
        loggers: &["CENT", "CENTAUR"],
        sensors: &[],
        action: LoggerAction::BySensor(CENTAUR_SENSORS),
    },
    LoggerRule {
        label: "K2",
        loggers: &["K2", "ETNA", "MAK", "GRAN"],
        sensors: &[],
        action: LoggerAction::BySensor(K2_SENSORS),
    },
    LoggerRule {
        label: "Rock",
        loggers: &["ROCK", "OBSID", "BASALT"],
        sensors: &[],
        action: LoggerAction::BySensor(ROCK_SENSORS),
    },
    LoggerRule {
        label: "RefTek 72A",
        loggers: &["72A"],
        sensors: &[],
        action: LoggerAction::BySensor(REFTEK_72A_SENSORS),
    },
    LoggerRule {
        label: "Q330",
        loggers: &["Q330"],
        sensors: &[],
        action: LoggerAction::BySensor(Q330_SENSORS),
    },
    LoggerRule {
        label: "RefTek 130",
        loggers: &["130"],
        sensors: &[],
        action: LoggerAction::BySensor(REFTEK_130_SENSORS),
    },
    LoggerRule {
        label: "Smart",
        loggers: &["SMART"],
        sensors: &[],
        action: LoggerAction::BySensor(SMART_SENSORS),
    },
];

/// Used when the identifier names no logger.
pub static SENSOR_ONLY_RULES: &[SensorRule] = &[
    sensor(&["320"], LevelRule::Gravity(2.0)),
    sensor(&["CMG-5TD", "CMG-5T"], LevelRule::Gravity(4.0)),
    sensor(&["EPISENSOR DECK"], LevelRule::Gravity(2.0)),
    sensor(&["EPISENSOR"], LevelRule::Gravity(4.0)),
    sensor(&["RT147"], LevelRule::Gravity(4.0)),
    sensor(&["TITAN"], LevelRule::Gravity(4.0)),
    sensor(&["FBA"], LevelRule::Gravity(1.0)),
    sensor(&["GEOSIG-AC-63"], LevelRule::Gravity(3.0)),
    sensor(&["CMG-40T", "CMG40T"], LevelRule::Velocity(0.0125)),
    sensor(&["CMG-3T"], LevelRule::Velocity(0.0067)),
    sensor(&["CMG-3ESP"], LevelRule::Velocity(0.005)),
    sensor(&["TRILLIUM COMPACT", "CASCADIA"], LevelRule::Velocity(0.026)),
    sensor(&["TRILLIUM", "TR240", "TR120", "T120PA"], LevelRule::Velocity(0.0166)),
    sensor(&["STS-2"], LevelRule::Velocity(0.012)),
    sensor(&["CMG-6T", "CMG-EDU"], LevelRule::Velocity(0.00417)),
    sensor(&["HS-1-LT"], LevelRule::Velocity(0.001)),
    sensor(&["L-4C"], LevelRule::Velocity(0.001)),
    sensor(&["L-22"], LevelRule::Velocity(0.001)),
    sensor(&["SS-1"], LevelRule::Velocity(0.001)),
    sensor(&["S-13"], LevelRule::Velocity(0.001)),
];

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| haystack.contains(pattern))
}

fn scaled_level(
    level: LevelRule,
    serial_override: Option<SerialOverride>,
    equipment: &EquipmentIdentifier,
    gain: f64,
) -> f64 {
    let base = level.apply(gain);
    match serial_override {
        Some(rule) if rule.applies_to(equipment) => base * rule.factor,
        _ => base,
    }
}

fn first_sensor_match(
    rules: &[SensorRule],
    sensor_family: &str,
    equipment: &EquipmentIdentifier,
    gain: f64,
) -> ClipLevel {
    rules
        .iter()
        .find(|rule| contains_any(sensor_family, rule.sensors))
        .map_or(ClipLevel::Unknown, |rule| {
            ClipLevel::from(scaled_level(rule.level, rule.serial_override, equipment, gain))
        })
}

/// Full-scale level in counts for `equipment` at channel gain `gain`.
pub fn infer_clip_level(equipment: &EquipmentIdentifier, gain: f64) -> ClipLevel {
    let sensor_family = equipment.sensor_family.trim().to_uppercase();

    let logger_family = match equipment.logger_family.as_deref() {
        Some(logger) if equipment.has_logger() => logger.trim().to_uppercase(),
        _ => {
            let level = first_sensor_match(SENSOR_ONLY_RULES, &sensor_family, equipment, gain);
            debug!("sensor-only clip level for {sensor_family}: {}", level.as_f64());
            return level;
        }
    };

    let Some(rule) = LOGGER_RULES.iter().find(|rule| {
        contains_any(&logger_family, rule.loggers) || contains_any(&sensor_family, rule.sensors)
    }) else {
        debug!("no clip rule for logger {logger_family} with sensor {sensor_family}");
        return ClipLevel::Unknown;
    };

    let level = match rule.action {
        LoggerAction::Uniform {
            level,
            serial_override,
        } => ClipLevel::from(scaled_level(level, serial_override, equipment, gain)),
        LoggerAction::BySensor(rules) => {
            first_sensor_match(rules, &sensor_family, equipment, gain)
        }
        LoggerAction::ByLoggerToken {
            token,
            matched,
            otherwise,
        } => ClipLevel::Known(if logger_family.contains(token) {
            matched
        } else {
            otherwise
        }),
    };
    debug!(
        "{} logger {logger_family}: clip level {}",
        rule.label,
        level.as_f64()
    );
    level
}
