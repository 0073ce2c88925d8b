use super::CliError;
use anyhow::Context;
use simresp_core::common::{ReductionConfig, load_reduction_config};
use simresp_core::domain::{ClipLevel, EquipmentIdentifier};
use simresp_core::pipeline::{ChannelOutcome, ChannelStatus, ReductionSummary};
use std::fs;
use std::path::Path;

pub(super) fn load_config(path: Option<&Path>) -> Result<ReductionConfig, CliError> {
    match path {
        Some(path) => load_reduction_config(path).map_err(CliError::Compute),
        None => Ok(ReductionConfig::default()),
    }
}

/// Blank lines and `#` comments are skipped.
pub(super) fn read_identifier_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read identifier list '{}'", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub(super) fn render_identifier(equipment: &EquipmentIdentifier) -> String {
    format!(
        "sensor={} sensorSerial={} logger={} loggerSerial={}",
        equipment.sensor_family,
        equipment.sensor_serial,
        equipment.logger_family.as_deref().unwrap_or("-"),
        equipment.logger_serial.as_deref().unwrap_or("-")
    )
}

pub(super) fn render_human_summary(
    summary: &ReductionSummary,
    outcomes: &[ChannelOutcome],
) -> String {
    let mut lines = Vec::new();
    let status = if summary.has_failures() { "FAIL" } else { "PASS" };
    lines.push(format!("Reduction status: {status}"));
    lines.push(format!(
        "Channels: {} total ({} reduced, {} failed)",
        summary.attempted, summary.reduced, summary.failed
    ));
    lines.push(format!(
        "Unknown clip levels: {}, unparseable identifiers: {}, advisories: {}",
        summary.unknown_clip_levels, summary.unparseable_identifiers, summary.advisory_count
    ));

    for outcome in outcomes {
        match &outcome.status {
            ChannelStatus::Reduced { reduction } => {
                let response = &reduction.response;
                let clip = match reduction.clip_level {
                    ClipLevel::Known(level) => format!("{level:.1}"),
                    ClipLevel::Unknown => "unknown".to_string(),
                };
                lines.push(format!(
                    "Channel {}: fn={:.4} Hz, damping={:.4}, corners={:.4}-{:.4} Hz, gain={:.6e} {}, clip={}",
                    outcome.seed_id,
                    response.natural_frequency,
                    response.damping,
                    response.low_corner_hz,
                    response.high_corner_hz,
                    response.gain,
                    response.gain_units,
                    clip
                ));
            }
            ChannelStatus::Failed { error } => {
                lines.push(format!(
                    "Channel {}: FAILED [{}] {}",
                    outcome.seed_id, error.code, error.message
                ));
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{read_identifier_file, render_human_summary, render_identifier};
    use simresp_core::domain::{EquipmentIdentifier, ResponseError};
    use simresp_core::pipeline::{ChannelOutcome, ChannelStatus, ReductionSummary};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn identifier_file_skips_comments_and_blanks() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("ids.txt");
        fs::write(&path, "# station list\nSTS2-1=Q330-2\n\n  ES-T-1234=K2-5678  \n")
            .expect("list should be written");

        let identifiers = read_identifier_file(&path).expect("list should load");
        assert_eq!(identifiers, ["STS2-1=Q330-2", "ES-T-1234=K2-5678"]);

        let error = read_identifier_file(&temp.path().join("missing.txt"))
            .expect_err("missing list should fail");
        assert!(format!("{error:#}").contains("failed to read identifier list"));
    }

    #[test]
    fn sensor_only_identifier_renders_placeholders() {
        let equipment = EquipmentIdentifier::new("CMG-5TD", "XXXX", None, None);
        assert_eq!(
            render_identifier(&equipment),
            "sensor=CMG-5TD sensorSerial=XXXX logger=- loggerSerial=-"
        );
    }

    #[test]
    fn summary_lists_failed_channels() {
        let summary = ReductionSummary {
            attempted: 1,
            failed: 1,
            ..ReductionSummary::default()
        };
        let outcomes = [ChannelOutcome {
            seed_id: "UW.EMPT.00.ENZ".to_string(),
            status: ChannelStatus::from_error(&ResponseError::invalid_response("no poles")),
        }];

        let rendered = render_human_summary(&summary, &outcomes);
        assert!(rendered.starts_with("Reduction status: FAIL"));
        assert!(rendered.contains("Channels: 1 total (0 reduced, 1 failed)"));
        assert!(rendered.contains("Channel UW.EMPT.00.ENZ: FAILED [INPUT.INVALID_RESPONSE]"));
    }
}
