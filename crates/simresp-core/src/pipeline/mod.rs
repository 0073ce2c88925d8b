//! Per-channel reduction and the serial batch driver.

pub mod inventory;
pub mod traits;

pub use inventory::{
    InventoryDocument, JsonInventorySource, JsonReportSink, load_inventory, write_report,
};
pub use traits::{ChannelSource, ReductionSink};

use crate::common::ReductionConfig;
use crate::domain::{
    Advisory, ChannelReduction, ChannelRequest, ClipLevel, EquipmentIdentifier, ExecutionMode,
    ResponseError, ResponseResult,
};
use crate::equipment::{CLIP_RULES_VERSION, infer_clip_level, parse_equipment_identifier};
use crate::response::simple_response;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Reduces one channel and infers its clip level.
///
/// Only response errors are fatal. A missing or unparseable equipment
/// identifier leaves the clip level unknown and is reported as an advisory.
pub fn reduce_channel(
    request: &ChannelRequest,
    config: &ReductionConfig,
) -> ResponseResult<ChannelReduction> {
    let outcome = simple_response(request.sample_rate, &request.response, config)?;
    let mut advisories = outcome.advisories;

    let equipment = resolve_equipment(request.equipment.as_deref(), &mut advisories)?;
    let clip_level = match &equipment {
        Some(equipment) => {
            let level = infer_clip_level(equipment, outcome.response.gain);
            if !level.is_known() {
                push_advisory(
                    &mut advisories,
                    Advisory::UnknownClipRule {
                        channel: request.seed_id(),
                        sensor: equipment.sensor_family.clone(),
                        logger: equipment.logger_family.clone(),
                    },
                );
            }
            level
        }
        None => ClipLevel::Unknown,
    };

    Ok(ChannelReduction {
        response: outcome.response,
        clip_level,
        equipment,
        advisories,
    })
}

fn resolve_equipment(
    raw: Option<&str>,
    advisories: &mut Vec<Advisory>,
) -> ResponseResult<Option<EquipmentIdentifier>> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        push_advisory(advisories, Advisory::MissingIdentifier);
        return Ok(None);
    };

    match parse_equipment_identifier(raw) {
        Ok(equipment) => Ok(Some(equipment)),
        Err(ResponseError::UnparseableIdentifier { identifier, reason }) => {
            push_advisory(
                advisories,
                Advisory::UnparseableIdentifier { identifier, reason },
            );
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

fn push_advisory(advisories: &mut Vec<Advisory>, advisory: Advisory) {
    warn!("{advisory}");
    advisories.push(advisory);
}

/// Error details kept for a channel whose reduction failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelFailure {
    pub code: String,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChannelStatus {
    Reduced { reduction: ChannelReduction },
    Failed { error: ChannelFailure },
}

impl ChannelStatus {
    pub fn from_error(error: &ResponseError) -> Self {
        Self::Failed {
            error: ChannelFailure {
                code: error.placeholder().to_string(),
                category: error.category().as_str().to_string(),
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutcome {
    pub seed_id: String,
    #[serde(flatten)]
    pub status: ChannelStatus,
}

impl ChannelOutcome {
    pub fn reduction(&self) -> Option<&ChannelReduction> {
        match &self.status {
            ChannelStatus::Reduced { reduction } => Some(reduction),
            ChannelStatus::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReductionSummary {
    pub attempted: usize,
    pub reduced: usize,
    pub failed: usize,
    pub unknown_clip_levels: usize,
    pub unparseable_identifiers: usize,
    pub advisory_count: usize,
}

impl ReductionSummary {
    pub fn record(&mut self, outcome: &ChannelOutcome) {
        self.attempted += 1;
        match &outcome.status {
            ChannelStatus::Reduced { reduction } => {
                self.reduced += 1;
                if !reduction.clip_level.is_known() {
                    self.unknown_clip_levels += 1;
                }
                self.unparseable_identifiers += reduction
                    .advisories
                    .iter()
                    .filter(|advisory| matches!(advisory, Advisory::UnparseableIdentifier { .. }))
                    .count();
                self.advisory_count += reduction.advisories.len();
            }
            ChannelStatus::Failed { .. } => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReductionReport {
    pub clip_rules_version: String,
    pub execution_mode: ExecutionMode,
    pub summary: ReductionSummary,
    pub channels: Vec<ChannelOutcome>,
}

impl ReductionReport {
    pub fn new(summary: ReductionSummary, channels: Vec<ChannelOutcome>) -> Self {
        Self {
            clip_rules_version: CLIP_RULES_VERSION.to_string(),
            execution_mode: ExecutionMode::Serial,
            summary,
            channels,
        }
    }
}

fn reduce_outcome(request: &ChannelRequest, config: &ReductionConfig) -> ChannelOutcome {
    let seed_id = request.seed_id();
    let status = match reduce_channel(request, config) {
        Ok(reduction) => ChannelStatus::Reduced { reduction },
        Err(error) => {
            warn!("{seed_id}: {}", error.diagnostic_line());
            ChannelStatus::from_error(&error)
        }
    };
    ChannelOutcome { seed_id, status }
}

/// Reduces every request in order. A failing channel is recorded and the
/// batch continues.
pub fn reduce_channels(
    requests: &[ChannelRequest],
    config: &ReductionConfig,
) -> ResponseResult<ReductionReport> {
    config.validate()?;
    let mut summary = ReductionSummary::default();
    let mut channels = Vec::with_capacity(requests.len());

    for (index, request) in requests.iter().enumerate() {
        info!(
            "reducing channel {} of {}: {}",
            index + 1,
            requests.len(),
            request.seed_id()
        );
        let outcome = reduce_outcome(request, config);
        summary.record(&outcome);
        channels.push(outcome);
    }

    info!(
        "reduced {} of {} channels ({} failed)",
        summary.reduced, summary.attempted, summary.failed
    );
    Ok(ReductionReport::new(summary, channels))
}

/// Streams every channel from `source` through the reduction into `sink`.
pub fn run_reduction<S, K>(
    source: &mut S,
    sink: &mut K,
    config: &ReductionConfig,
) -> ResponseResult<ReductionSummary>
where
    S: ChannelSource + ?Sized,
    K: ReductionSink + ?Sized,
{
    config.validate()?;
    let requests = source.channels()?;
    let mut summary = ReductionSummary::default();

    for (index, request) in requests.iter().enumerate() {
        info!(
            "reducing channel {} of {}: {}",
            index + 1,
            requests.len(),
            request.seed_id()
        );
        let outcome = reduce_outcome(request, config);
        summary.record(&outcome);
        sink.accept(outcome)?;
    }

    sink.finish(&summary)?;
    info!(
        "reduced {} of {} channels ({} failed)",
        summary.reduced, summary.attempted, summary.failed
    );
    Ok(summary)
}
