//! Bootstrap sequencer
//!
//! Drives the preloader: a 0 to 100 progress value with logo and caption
//! entrances running alongside, a dwell once progress is full, then an exit
//! timeline (bar collapse, preloader fade). The exit's completion emits the
//! `done` signal exactly once; the host mounts the rest of the page on it.

use crate::clock::{AnimationId, ClockHandle};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::scope::Scope;
use crate::timeline::{Position, Timeline};
use crate::tween::Tween;
use folio_core::{Signal, Target, TargetRef, TargetResolver, Targets, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Bootstrap timings (seconds)
#[derive(Clone, Debug, PartialEq)]
pub struct BootstrapConfig {
    pub progress_duration: f64,
    pub progress_ease: Easing,
    pub logo_duration: f64,
    /// Caption entrance offset from the timeline start
    pub text_offset: f64,
    pub text_duration: f64,
    /// Pause between full progress and the exit
    pub dwell: f64,
    pub bar_exit_duration: f64,
    pub preloader_exit_duration: f64,
    /// How much the preloader fade overlaps the bar collapse
    pub exit_overlap: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            progress_duration: 2.5,
            progress_ease: Easing::EaseOutCubic,
            logo_duration: 1.0,
            text_offset: 0.5,
            text_duration: 0.8,
            dwell: 0.8,
            bar_exit_duration: 0.5,
            preloader_exit_duration: 1.0,
            exit_overlap: 0.3,
        }
    }
}

impl BootstrapConfig {
    fn validate(&self) -> Result<()> {
        let delays = [self.text_offset, self.dwell, self.exit_overlap];
        if let Some(bad) = delays.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(AnimationError::InvalidDelay(*bad));
        }
        Ok(())
    }

    /// Time from start until the exit timeline finishes
    pub fn total_duration(&self) -> f64 {
        let entrance = self
            .progress_duration
            .max(self.logo_duration)
            .max(self.text_offset + self.text_duration);
        let exit = self
            .bar_exit_duration
            .max(self.bar_exit_duration - self.exit_overlap + self.preloader_exit_duration);
        entrance + self.dwell + exit
    }
}

/// Preloader phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapPhase {
    Running,
    ExitAnimating,
    Done,
}

/// Elements the sequencer animates
#[derive(Clone, Debug, Default)]
pub struct BootstrapTargets {
    /// Extra targets that receive the `progress` value (labels, bars)
    pub progress: Targets,
    pub logo: Targets,
    pub text: Targets,
    pub bar: Targets,
    pub preloader: Targets,
}

impl BootstrapTargets {
    /// Resolve the preloader's conventional selectors
    pub fn query(resolver: &dyn TargetResolver) -> Self {
        Self {
            progress: Targets::query(resolver, "#loading-progress"),
            logo: Targets::query(resolver, ".loading-logo"),
            text: Targets::query(resolver, ".loading-text"),
            bar: Targets::query(resolver, ".progress-bar"),
            preloader: Targets::query(resolver, ".preloader"),
        }
    }
}

/// Holds the progress value and counts how often it reached 100
#[derive(Debug, Default)]
pub struct ProgressCell {
    value: f32,
    full_writes: u32,
}

impl ProgressCell {
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Rounded percentage for display
    pub fn percent(&self) -> u32 {
        self.value.round().clamp(0.0, 100.0) as u32
    }

    /// Number of writes of exactly 100
    pub fn full_writes(&self) -> u32 {
        self.full_writes
    }
}

impl Target for ProgressCell {
    fn get(&self, property: &str) -> Option<Value> {
        (property == "progress").then(|| Value::number(self.value))
    }

    fn set(&mut self, property: &str, value: Value) {
        if property != "progress" {
            return;
        }
        if let Some(v) = value.as_f32() {
            self.value = v;
            if v == 100.0 {
                self.full_writes += 1;
            }
        }
    }

    fn debug_name(&self) -> &str {
        "progress"
    }
}

struct BootstrapState {
    phase: Cell<BootstrapPhase>,
    done: Signal,
    exit: RefCell<Option<Timeline>>,
    exit_id: Cell<Option<AnimationId>>,
    /// Full-progress writes seen when the exit started
    full_writes_at_exit: Cell<Option<u32>>,
}

/// A running bootstrap sequence
pub struct Bootstrap {
    state: Rc<BootstrapState>,
    scope: Scope,
    cell: Rc<RefCell<ProgressCell>>,
    entrance: AnimationId,
}

impl Bootstrap {
    /// Build and schedule the sequence on `clock` inside its own scope
    pub fn start(
        clock: &ClockHandle,
        targets: &BootstrapTargets,
        config: &BootstrapConfig,
    ) -> Result<Bootstrap> {
        config.validate()?;

        let cell = Rc::new(RefCell::new(ProgressCell::default()));
        let cell_target: TargetRef = cell.clone();
        let mut progress_targets = Targets::from(&cell_target);
        for extra in targets.progress.upgrade_all() {
            progress_targets.push(&extra);
        }

        let progress = Tween::build(progress_targets)
            .from_to("progress", 0.0, 100.0)
            .duration(config.progress_duration)
            .ease(config.progress_ease)
            .essential()
            .finish()?;
        let logo = Tween::build(targets.logo.clone())
            .from_to("opacity", 0.0, 1.0)
            .from_to("scale", 0.8, 1.0)
            .from_to("blur", Value::px(10.0), Value::px(0.0))
            .duration(config.logo_duration)
            .finish()?;
        let text = Tween::build(targets.text.clone())
            .from_to("opacity", 0.0, 1.0)
            .from_to("y", Value::px(20.0), Value::px(0.0))
            .duration(config.text_duration)
            .finish()?;

        let bar = Tween::build(targets.bar.clone())
            .to("scaleX", 0.0)
            .duration(config.bar_exit_duration)
            .ease(Easing::EaseInCubic)
            .finish()?;
        let preloader = Tween::build(targets.preloader.clone())
            .to("opacity", 0.0)
            .to("scale", 0.9)
            .to("blur", Value::px(10.0))
            .duration(config.preloader_exit_duration)
            .ease(Easing::EaseInOutCubic)
            .finish()?;

        let state = Rc::new(BootstrapState {
            phase: Cell::new(BootstrapPhase::Running),
            done: Signal::new(),
            exit: RefCell::new(None),
            exit_id: Cell::new(None),
            full_writes_at_exit: Cell::new(None),
        });

        let finished = state.clone();
        let mut exit = Timeline::new().on_complete(move || {
            if finished.phase.get() == BootstrapPhase::Done {
                return;
            }
            finished.phase.set(BootstrapPhase::Done);
            tracing::debug!("bootstrap done");
            finished.done.emit();
        });
        exit.then(bar);
        exit.add(preloader, Position::AfterPrevious(-config.exit_overlap));
        *state.exit.borrow_mut() = Some(exit);

        let mut entrance = Timeline::new();
        entrance.add(progress, Position::Absolute(0.0));
        entrance.add(logo, Position::Absolute(0.0));
        entrance.add(text, Position::Absolute(config.text_offset));

        let scope = Scope::named(clock, "bootstrap");
        let (dwell_state, dwell_scope, dwell_cell) = (state.clone(), scope.clone(), cell.clone());
        let dwell = config.dwell;
        let at_end = Position::Absolute(entrance.duration());
        entrance.call(
            move || {
                if dwell_state.phase.get() != BootstrapPhase::Running || dwell_scope.is_reverted() {
                    return;
                }
                tracing::debug!(dwell, "bootstrap progress full");
                let (exit_state, exit_scope, exit_cell) =
                    (dwell_state.clone(), dwell_scope.clone(), dwell_cell.clone());
                dwell_scope.run(|| {
                    dwell_scope.clock().delayed_call(dwell, move || {
                        begin_exit(&exit_state, &exit_scope, &exit_cell);
                    })
                });
            },
            at_end,
        );

        let entrance = scope.add(entrance);
        tracing::debug!(?entrance, "bootstrap started");

        Ok(Bootstrap {
            state,
            scope,
            cell,
            entrance,
        })
    }

    pub fn phase(&self) -> BootstrapPhase {
        self.state.phase.get()
    }

    /// Emitted once when the exit animation completes
    pub fn done(&self) -> Signal {
        self.state.done.clone()
    }

    pub fn is_done(&self) -> bool {
        self.phase() == BootstrapPhase::Done
    }

    /// Current progress value (0 to 100)
    pub fn progress(&self) -> f32 {
        self.cell.borrow().value()
    }

    pub fn progress_cell(&self) -> Rc<RefCell<ProgressCell>> {
        self.cell.clone()
    }

    /// How many times progress read exactly 100 before the exit began
    pub fn full_writes_before_exit(&self) -> Option<u32> {
        self.state.full_writes_at_exit.get()
    }

    pub fn entrance(&self) -> AnimationId {
        self.entrance
    }

    /// Exit timeline id, once the exit has begun
    pub fn exit(&self) -> Option<AnimationId> {
        self.state.exit_id.get()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Stop everything; `done` will never fire
    pub fn cancel(&self) {
        self.scope.revert();
    }
}

fn begin_exit(state: &BootstrapState, scope: &Scope, cell: &Rc<RefCell<ProgressCell>>) {
    if state.phase.get() != BootstrapPhase::Running {
        return;
    }
    let Some(exit) = state.exit.borrow_mut().take() else {
        return;
    };

    state.phase.set(BootstrapPhase::ExitAnimating);
    state
        .full_writes_at_exit
        .set(Some(cell.borrow().full_writes()));

    let id = scope.add(exit);
    state.exit_id.set(Some(id));
    tracing::debug!(?id, "bootstrap exit started");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::AnimationClock;

    #[test]
    fn test_progress_cell_counts_full_writes() {
        let mut cell = ProgressCell::default();
        cell.set("progress", Value::number(99.6));
        assert_eq!(cell.percent(), 100);
        assert_eq!(cell.full_writes(), 0);
        cell.set("progress", Value::number(100.0));
        assert_eq!(cell.full_writes(), 1);
        cell.set("opacity", Value::number(100.0));
        assert_eq!(cell.full_writes(), 1);
    }

    #[test]
    fn test_total_duration() {
        let config = BootstrapConfig::default();
        assert!((config.total_duration() - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let clock = AnimationClock::new();
        let config = BootstrapConfig {
            dwell: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Bootstrap::start(&clock.handle(), &BootstrapTargets::default(), &config),
            Err(AnimationError::InvalidDelay(_))
        ));

        let config = BootstrapConfig {
            progress_duration: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            Bootstrap::start(&clock.handle(), &BootstrapTargets::default(), &config),
            Err(AnimationError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_cancel_prevents_done() {
        let clock = AnimationClock::new();
        let bootstrap =
            Bootstrap::start(&clock.handle(), &BootstrapTargets::default(), &Default::default())
                .unwrap();
        for frame in 0..60 {
            clock.advance(frame as f64 / 60.0);
        }
        bootstrap.cancel();
        for frame in 60..600 {
            clock.advance(frame as f64 / 60.0);
        }
        assert_eq!(bootstrap.phase(), BootstrapPhase::Running);
        assert!(!bootstrap.done().is_set());
    }
}
