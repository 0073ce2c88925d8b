//! JSON inventory input and JSON report output.

use super::traits::{ChannelSource, ReductionSink};
use super::{ChannelOutcome, ReductionReport, ReductionSummary};
use crate::domain::{ChannelRequest, ResponseError, ResponseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDocument {
    pub channels: Vec<ChannelRequest>,
}

pub fn load_inventory(inventory_path: impl AsRef<Path>) -> ResponseResult<InventoryDocument> {
    let inventory_path = inventory_path.as_ref();
    let source = fs::read_to_string(inventory_path).map_err(|source| ResponseError::Read {
        path: inventory_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ResponseError::Parse {
        path: inventory_path.to_path_buf(),
        source,
    })
}

pub fn write_report(report_path: &Path, report: &ReductionReport) -> ResponseResult<()> {
    if let Some(parent_dir) = report_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent_dir).map_err(|source| ResponseError::Write {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    let report_json = serde_json::to_string_pretty(report).map_err(ResponseError::Encode)?;
    fs::write(report_path, report_json).map_err(|source| ResponseError::Write {
        path: report_path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct JsonInventorySource {
    path: PathBuf,
}

impl JsonInventorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChannelSource for JsonInventorySource {
    fn channels(&mut self) -> ResponseResult<Vec<ChannelRequest>> {
        Ok(load_inventory(&self.path)?.channels)
    }
}

/// Collects outcomes and writes the full report once the run finishes.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    path: PathBuf,
    channels: Vec<ChannelOutcome>,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            channels: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn outcomes(&self) -> &[ChannelOutcome] {
        &self.channels
    }
}

impl ReductionSink for JsonReportSink {
    fn accept(&mut self, outcome: ChannelOutcome) -> ResponseResult<()> {
        self.channels.push(outcome);
        Ok(())
    }

    fn finish(&mut self, summary: &ReductionSummary) -> ResponseResult<()> {
        let report = ReductionReport::new(*summary, self.channels.clone());
        write_report(&self.path, &report)
    }
}
