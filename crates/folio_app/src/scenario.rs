//! Scenario definition for headless runs.

use crate::app::MountPhase;
use crate::page::SectionKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Sequence of host events and checks.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Run frames until at least `ms` of clock time has passed
    Wait { ms: u64 },
    Tick { frames: u32 },
    /// Run frames until the page reaches `phase` (at most `max_frames`)
    WaitFor {
        phase: MountPhase,
        #[serde(default = "default_wait_frames")]
        max_frames: u32,
    },
    Scroll { y: f32 },
    ScrollBy { delta: f32 },
    Resize { width: f32, height: f32 },
    Unmount { section: SectionKind },
    Detach { id: String },
    Pointer { x: f32, y: f32 },
    Menu { open: bool },
    Submit,
    Snapshot {
        #[serde(default)]
        label: Option<String>,
        /// Elements to include; empty means every element with properties
        #[serde(default)]
        ids: Vec<String>,
    },
    AssertPhase { phase: MountPhase },
    AssertProperty {
        id: String,
        property: String,
        /// Expected value as written in CSS (`"0.5"`, `"-25%"`)
        value: String,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
}

fn default_wait_frames() -> u32 {
    3600
}

fn default_tolerance() -> f32 {
    1e-3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [
                { "type": "wait_for", "phase": "ready" },
                { "type": "scroll", "y": 1200 },
                { "type": "tick", "frames": 2 },
                { "type": "unmount", "section": "about" },
                { "type": "submit" },
                { "type": "snapshot", "label": "after", "ids": ["bio-text"] },
                { "type": "assert_property", "id": "bio-text", "property": "opacity", "value": "1" }
            ] }"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 7);
        assert!(matches!(
            scenario.steps[0],
            ScenarioStep::WaitFor { phase: MountPhase::Ready, max_frames: 3600 }
        ));
        assert!(matches!(
            scenario.steps[3],
            ScenarioStep::Unmount { section: SectionKind::About }
        ));
        assert!(matches!(
            &scenario.steps[6],
            ScenarioStep::AssertProperty { tolerance, .. } if *tolerance == 1e-3
        ));
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Scenario::from_json(r#"{ "steps": [{ "type": "explode" }] }"#).is_err());
    }
}
