//! Report output model for headless runs.

use crate::app::{EventTally, MountPhase, PageSnapshot};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path};

/// Report status for a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Machine-readable result of a headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    pub phase: MountPhase,
    pub events: EventTally,
    pub snapshots: Vec<PageSnapshot>,
}

/// Where the run stood when the report was produced
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    pub phase: MountPhase,
    pub events: EventTally,
}

impl RunReport {
    pub fn passed(summary: RunSummary, snapshots: Vec<PageSnapshot>) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            elapsed_frames: summary.elapsed_frames,
            elapsed_ms: summary.elapsed_ms,
            phase: summary.phase,
            events: summary.events,
            snapshots,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        summary: RunSummary,
        snapshots: Vec<PageSnapshot>,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            elapsed_frames: summary.elapsed_frames,
            elapsed_ms: summary.elapsed_ms,
            phase: summary.phase,
            events: summary.events,
            snapshots,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if path.is_absolute() || path.has_root() {
            bail!("report path must be relative and must not start with a separator");
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("report path cannot contain '..' or drive prefixes");
        }
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            elapsed_frames: 3,
            elapsed_ms: 50,
            phase: MountPhase::Loading,
            events: EventTally::default(),
        }
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let report = RunReport::passed(summary(), Vec::new());
        assert!(report.write_to_path(Path::new("/tmp/report.json")).is_err());
        assert!(report.write_to_path(Path::new("../report.json")).is_err());
    }

    #[test]
    fn test_writer_output_is_json() {
        let report = RunReport::failed("assert_phase", 2, "nope".to_string(), summary(), Vec::new());
        let mut out = Vec::new();
        report.write_to_writer(&mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["failed_step_index"], 2);
        assert_eq!(value["phase"], "loading");
        assert!(report.is_failed());
    }
}
