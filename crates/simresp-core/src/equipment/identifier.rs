//! Parser for free-text equipment identifiers.
//!
//! Identifiers look like `sensor-serial=logger-serial` or
//! `sensor-serial=vco-serial=disc-serial=logger-serial`. Dataless-derived
//! inventories instead carry `model,description,type` with no logger.

use crate::common::constants::PLACEHOLDER_SERIAL;
use crate::domain::{EquipmentIdentifier, ParserResult, ResponseError};

const LEGACY_SHORT_PERIOD_IDENTIFIER: &str = "Mark L-4 1 Hz";
const LEGACY_SENSOR_FAMILY: &str = "OLD_SHORT_PERIOD";
const LEGACY_LOGGER_FAMILY: &str = "LEGACY_ANALOG_DIGITIZER";

/// Episensors are `ES-T`, the only family with an embedded hyphen.
const EPISENSOR_PREFIX: &str = "ES-T-";
const EPISENSOR_FAMILY: &str = "ES_T";

pub fn parse_equipment_identifier(identifier: &str) -> ParserResult<EquipmentIdentifier> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(ResponseError::unparseable_identifier(
            identifier,
            "identifier is empty",
        ));
    }

    if trimmed == LEGACY_SHORT_PERIOD_IDENTIFIER {
        return Ok(EquipmentIdentifier::new(
            LEGACY_SENSOR_FAMILY,
            PLACEHOLDER_SERIAL,
            Some(LEGACY_LOGGER_FAMILY.to_string()),
            Some(PLACEHOLDER_SERIAL.to_string()),
        ));
    }

    let stages: Vec<&str> = trimmed.split('=').collect();
    match stages.as_slice() {
        [sensor, logger] | [sensor, _, _, logger] => {
            let (sensor_family, sensor_serial) = split_sensor_token(identifier, sensor)?;
            let (logger_family, logger_serial) = split_family_serial(identifier, logger)?;
            Ok(EquipmentIdentifier::new(
                sensor_family,
                sensor_serial,
                Some(logger_family),
                Some(logger_serial),
            ))
        }
        [single] => {
            let fields: Vec<&str> = single.split(',').collect();
            match fields.as_slice() {
                [model, _, _] if !model.trim().is_empty() => Ok(EquipmentIdentifier::new(
                    model.trim(),
                    PLACEHOLDER_SERIAL,
                    None,
                    None,
                )),
                _ => Err(ResponseError::unparseable_identifier(
                    identifier,
                    format!(
                        "single-stage identifier needs 3 comma-separated fields, found {}",
                        fields.len()
                    ),
                )),
            }
        }
        _ => Err(ResponseError::unparseable_identifier(
            identifier,
            format!(
                "expected 2 or 4 '='-separated stages, found {}",
                stages.len()
            ),
        )),
    }
}

fn split_sensor_token(identifier: &str, token: &str) -> ParserResult<(String, String)> {
    let token = token.trim();
    if let Some(serial) = token.strip_prefix(EPISENSOR_PREFIX) {
        let serial = serial.trim();
        if serial.is_empty() {
            return Err(ResponseError::unparseable_identifier(
                identifier,
                format!("'{token}' has no serial number"),
            ));
        }
        return Ok((EPISENSOR_FAMILY.to_string(), serial.to_string()));
    }
    split_family_serial(identifier, token)
}

/// Splits at the first hyphen; the serial keeps any further hyphens.
fn split_family_serial(identifier: &str, token: &str) -> ParserResult<(String, String)> {
    let token = token.trim();
    let Some((family, serial)) = token.split_once('-') else {
        return Err(ResponseError::unparseable_identifier(
            identifier,
            format!("'{token}' lacks a '-' between family and serial"),
        ));
    };

    let (family, serial) = (family.trim(), serial.trim());
    if family.is_empty() || serial.is_empty() {
        return Err(ResponseError::unparseable_identifier(
            identifier,
            format!("'{token}' needs both a family and a serial number"),
        ));
    }
    Ok((family.to_string(), serial.to_string()))
}
