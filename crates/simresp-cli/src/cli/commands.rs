use super::CliError;
use super::helpers::*;
use simresp_core::common::constants::PLACEHOLDER_SERIAL;
use simresp_core::domain::{EquipmentIdentifier, ResponseError};
use simresp_core::equipment::{CLIP_RULES_VERSION, infer_clip_level, parse_equipment_identifier};
use simresp_core::pipeline::{JsonInventorySource, JsonReportSink, run_reduction};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(clap::Args)]
pub(super) struct ReduceArgs {
    /// JSON inventory with a `channels` array
    #[arg(value_name = "INVENTORY")]
    inventory: PathBuf,

    /// Reduction settings (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON report output path
    #[arg(long, default_value = "simresp-report.json")]
    report: PathBuf,
}

#[derive(clap::Args)]
#[command(group(clap::ArgGroup::new("input").required(true).multiple(true).args(["identifiers", "from_file"])))]
pub(super) struct IdentifyArgs {
    /// Equipment identifiers such as `STS2-100213=Q330-3456`
    #[arg(value_name = "IDENTIFIER")]
    identifiers: Vec<String>,

    /// Read additional identifiers from a file, one per line
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Print one JSON object per identifier
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ClipArgs {
    /// Sensor family, e.g. `CMG-5TD` or `ES_T`
    #[arg(long)]
    sensor: String,

    #[arg(long, default_value = PLACEHOLDER_SERIAL)]
    sensor_serial: String,

    /// Logger family; omit to use the sensor-only rules
    #[arg(long)]
    logger: Option<String>,

    #[arg(long)]
    logger_serial: Option<String>,

    /// Overall channel gain in counts per input unit
    #[arg(long)]
    gain: f64,
}

pub(super) fn run_reduce_command(args: ReduceArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    info!(
        "reducing inventory {} into {}",
        args.inventory.display(),
        args.report.display()
    );
    let mut source = JsonInventorySource::new(&args.inventory);
    let mut sink = JsonReportSink::new(&args.report);

    let summary = run_reduction(&mut source, &mut sink, &config).map_err(CliError::Compute)?;
    println!("{}", render_human_summary(&summary, sink.outcomes()));
    println!("JSON report: {}", args.report.display());

    if summary.has_failures() { Ok(1) } else { Ok(0) }
}

pub(super) fn run_identify_command(args: IdentifyArgs) -> Result<i32, CliError> {
    let mut identifiers = args.identifiers;
    if let Some(path) = &args.from_file {
        identifiers.extend(read_identifier_file(path)?);
    }
    debug!("parsing {} equipment identifiers", identifiers.len());

    for raw in &identifiers {
        let equipment = parse_equipment_identifier(raw).map_err(CliError::Compute)?;
        if args.json {
            let line = serde_json::to_string(&equipment)
                .map_err(|source| CliError::Compute(ResponseError::Encode(source)))?;
            println!("{line}");
        } else {
            println!("{}", render_identifier(&equipment));
        }
    }
    Ok(0)
}

pub(super) fn run_clip_command(args: ClipArgs) -> Result<i32, CliError> {
    if !args.gain.is_finite() || args.gain <= 0.0 {
        return Err(CliError::Usage(format!(
            "--gain must be finite and > 0, got {}",
            args.gain
        )));
    }

    let equipment = EquipmentIdentifier::new(
        args.sensor,
        args.sensor_serial,
        args.logger,
        args.logger_serial,
    );
    let level = infer_clip_level(&equipment, args.gain);
    println!("{}", level.as_f64());
    if !level.is_known() {
        eprintln!("no clip rule for {equipment} (rules {CLIP_RULES_VERSION})");
    }
    Ok(0)
}
