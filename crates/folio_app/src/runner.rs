//! Scenario runner that drives the page headlessly.

use crate::app::{PageSnapshot, PortfolioApp};
use crate::assert::{evaluate_assert_phase, evaluate_assert_property, AssertionResult};
use crate::report::{RunReport, RunSummary};
use crate::scenario::{Scenario, ScenarioStep};
use anyhow::{bail, Result};

/// Execute scenario JSON against a freshly started page.
pub fn run_scenario(app: &mut PortfolioApp, input: &str) -> Result<RunReport> {
    let scenario = Scenario::from_json(input)?;
    run_loaded_scenario(app, &scenario)
}

/// Execute a pre-loaded scenario.
pub fn run_loaded_scenario(app: &mut PortfolioApp, scenario: &Scenario) -> Result<RunReport> {
    let mut run = Run::new(app);

    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(step_index, ?step, "scenario step");
        match step {
            ScenarioStep::Wait { ms } => {
                let frames = wait_frames(*ms, run.app.config().frame_interval());
                run.frames(frames)?;
            }
            ScenarioStep::Tick { frames } => run.frames(*frames)?,
            ScenarioStep::WaitFor { phase, max_frames } => {
                let mut remaining = *max_frames;
                while run.app.phase() != *phase && remaining > 0 {
                    run.frames(1)?;
                    remaining -= 1;
                }
                if run.app.phase() != *phase {
                    let message = format!(
                        "page still {:?} after {} frames, expected {:?}",
                        run.app.phase(),
                        max_frames,
                        phase
                    );
                    return Ok(run.failed("wait_for", step_index, message));
                }
            }
            ScenarioStep::Scroll { y } => run.app.scroll_to(*y),
            ScenarioStep::ScrollBy { delta } => run.app.scroll_by(*delta),
            ScenarioStep::Resize { width, height } => {
                if !(*width > 0.0 && *height > 0.0) {
                    bail!("resize step {step_index}: dimensions must be non-zero");
                }
                run.app.resize(*width, *height);
            }
            ScenarioStep::Unmount { section } => {
                if !run.app.unmount(*section) {
                    tracing::warn!(section = %section, "unmount of a section that is not mounted");
                }
            }
            ScenarioStep::Detach { id } => {
                if !run.app.detach(id) {
                    tracing::warn!(id = %id, "detach of an unknown element");
                }
            }
            ScenarioStep::Pointer { x, y } => run.app.pointer(*x, *y)?,
            ScenarioStep::Menu { open } => run.app.menu(*open)?,
            ScenarioStep::Submit => run.app.submit()?,
            ScenarioStep::Snapshot { label, ids } => {
                let snapshot = run.app.snapshot(label.as_deref(), ids);
                run.snapshots.push(snapshot);
            }
            ScenarioStep::AssertPhase { phase } => {
                if let AssertionResult::Failed { message, .. } =
                    evaluate_assert_phase(*phase, run.app)
                {
                    return Ok(run.failed("assert_phase", step_index, message));
                }
            }
            ScenarioStep::AssertProperty {
                id,
                property,
                value,
                tolerance,
            } => {
                if let AssertionResult::Failed { message, .. } =
                    evaluate_assert_property(id, property, value, *tolerance, run.app)
                {
                    return Ok(run.failed("assert_property", step_index, message));
                }
            }
        }
    }

    Ok(run.passed())
}

/// Run a fixed number of frames and capture the final state.
pub fn run_frames(app: &mut PortfolioApp, frames: u32) -> Result<RunReport> {
    let mut run = Run::new(app);
    run.frames(frames)?;
    let snapshot = run.app.snapshot(Some("final"), &[]);
    run.snapshots.push(snapshot);
    Ok(run.passed())
}

/// Frames needed to carry the page through the preloader into its ready state
pub fn frames_until_ready(app: &PortfolioApp) -> u32 {
    let config = app.config();
    let Ok(bootstrap) = config.bootstrap_config() else {
        return 0;
    };
    let scale = config.clock.time_scale.max(f64::EPSILON);
    let seconds = bootstrap.total_duration() / scale + config.bootstrap.mount_delay;
    // A couple of frames of slack for the mount and refresh passes
    ((seconds / config.frame_interval()).ceil() as u32).saturating_add(3)
}

struct Run<'a> {
    app: &'a mut PortfolioApp,
    elapsed_frames: u64,
    elapsed_secs: f64,
    snapshots: Vec<PageSnapshot>,
}

impl<'a> Run<'a> {
    fn new(app: &'a mut PortfolioApp) -> Self {
        Self {
            app,
            elapsed_frames: 0,
            elapsed_secs: 0.0,
            snapshots: Vec::new(),
        }
    }

    fn frames(&mut self, frames: u32) -> Result<()> {
        let interval = self.app.config().frame_interval();
        for _ in 0..frames {
            self.app.frame()?;
            self.elapsed_frames = self.elapsed_frames.saturating_add(1);
            self.elapsed_secs += interval;
        }
        Ok(())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_frames: self.elapsed_frames,
            elapsed_ms: (self.elapsed_secs * 1000.0).round() as u64,
            phase: self.app.phase(),
            events: self.app.events(),
        }
    }

    fn passed(self) -> RunReport {
        RunReport::passed(self.summary(), self.snapshots)
    }

    fn failed(self, assertion: &str, step_index: usize, message: String) -> RunReport {
        tracing::warn!(step_index, assertion, %message, "scenario step failed");
        RunReport::failed(assertion, step_index, message, self.summary(), self.snapshots)
    }
}

fn wait_frames(wait_ms: u64, interval: f64) -> u32 {
    if wait_ms == 0 || interval <= 0.0 {
        return 0;
    }
    let frames = (wait_ms as f64 / 1000.0 / interval - 1e-9).ceil();
    frames.min(u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_frames_rounds_up() {
        assert_eq!(wait_frames(0, 1.0 / 60.0), 0);
        assert_eq!(wait_frames(1000, 1.0 / 60.0), 60);
        assert_eq!(wait_frames(20, 1.0 / 60.0), 2);
        assert_eq!(wait_frames(16, 0.016), 1);
    }
}
