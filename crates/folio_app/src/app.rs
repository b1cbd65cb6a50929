//! The portfolio host
//!
//! Owns the clock and the page, runs the preloader, and mounts the page once
//! the preloader signals done. The host drives time: one [`PortfolioApp::frame`]
//! call per display frame.

use crate::config::FolioConfig;
use crate::page::{PortfolioPage, SectionKind};
use crate::rng::Rng64;
use crate::sections;
use anyhow::{Context, Result};
use folio_animation::{
    AnimationClock, AnimationEvent, Bootstrap, BootstrapPhase, BootstrapTargets, ClockHandle,
    Scope,
};
use folio_core::{Signal, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Simulated round trip of the contact form before the button reacts
const SUBMIT_DELAY: f64 = 2.0;

/// How far the page has come up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountPhase {
    /// Preloader running
    Loading,
    /// Sections mounted, global scroll bindings pending
    Mounted,
    /// Everything installed
    Ready,
}

/// Observable state at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub frame: u64,
    pub time: f64,
    pub phase: MountPhase,
    pub bootstrap_progress: f32,
    pub scroll_y: f32,
    pub animations: usize,
    pub active_animations: usize,
    pub bindings: usize,
    pub mounted_sections: Vec<SectionKind>,
    /// Element id to property name to display value
    pub elements: BTreeMap<String, BTreeMap<String, String>>,
}

/// Counts of lifecycle events drained from the clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTally {
    pub started: u32,
    pub completed: u32,
    pub reverse_completed: u32,
    pub killed: u32,
}

impl EventTally {
    fn record(&mut self, event: AnimationEvent) {
        match event {
            AnimationEvent::Started(_) => self.started += 1,
            AnimationEvent::Completed(_) => self.completed += 1,
            AnimationEvent::ReverseCompleted(_) => self.reverse_completed += 1,
            AnimationEvent::Killed(_) => self.killed += 1,
        }
    }
}

pub struct PortfolioApp {
    config: FolioConfig,
    clock: AnimationClock,
    page: PortfolioPage,
    bootstrap: Bootstrap,
    phase: MountPhase,
    main: Option<Scope>,
    globals: Option<Scope>,
    globals_due: Option<Signal>,
    sections: BTreeMap<SectionKind, Scope>,
    /// Transient interactions (menu, pointer, submit)
    interactions: Option<Scope>,
    rng: Rng64,
    events: EventTally,
}

impl PortfolioApp {
    pub fn new(config: FolioConfig) -> Result<Self> {
        let viewport = Viewport::new(config.viewport.width, config.viewport.height);
        let clock = AnimationClock::with_viewport(viewport);
        let handle = clock.handle();
        handle.set_time_scale(config.clock.time_scale);
        handle.set_motion_preference(config.motion_preference());

        let page = PortfolioPage::new(&config.page, viewport);
        let bootstrap = Bootstrap::start(
            &handle,
            &BootstrapTargets::query(&page),
            &config.bootstrap_config()?,
        )
        .context("Failed to start the preloader")?;
        let rng = Rng64::new(config.page.seed);

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            fps = config.clock.fps,
            motion = ?config.motion_preference(),
            "portfolio started"
        );

        Ok(Self {
            config,
            clock,
            page,
            bootstrap,
            phase: MountPhase::Loading,
            main: None,
            globals: None,
            globals_due: None,
            sections: BTreeMap::new(),
            interactions: None,
            rng,
            events: EventTally::default(),
        })
    }

    pub fn handle(&self) -> ClockHandle {
        self.clock.handle()
    }

    pub fn page(&self) -> &PortfolioPage {
        &self.page
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn bootstrap_phase(&self) -> BootstrapPhase {
        self.bootstrap.phase()
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn events(&self) -> EventTally {
        self.events
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    pub fn is_mounted(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Advance one frame at the configured rate
    pub fn frame(&mut self) -> Result<()> {
        self.advance(self.config.frame_interval())
    }

    /// Advance by `dt` seconds, then react to whatever the frame finished
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        self.clock.tick(dt);
        for event in self.clock.handle().drain_events() {
            self.events.record(event);
        }

        if self.phase == MountPhase::Loading && self.bootstrap.is_done() {
            self.mount_page()?;
        }
        if self.phase == MountPhase::Mounted
            && self.globals_due.as_ref().is_some_and(Signal::is_set)
        {
            self.mount_globals()?;
        }
        Ok(())
    }

    fn mount_page(&mut self) -> Result<()> {
        let handle = self.clock.handle();
        self.page.remove_preloader();
        self.bootstrap.cancel();

        let main = sections::mount_main_content(&handle, &self.page)?;
        for kind in SectionKind::ALL {
            let scope = sections::mount(kind, &handle, &self.page, &mut self.rng)
                .with_context(|| format!("Failed to mount section `{kind}`"))?;
            self.sections.insert(kind, scope);
        }
        self.interactions = Some(Scope::named(&handle, "interactions"));

        // Global bindings wait for the first layout pass of the new content
        let due = Signal::new();
        let ready = due.clone();
        main.run(|| handle.delayed_call(self.config.bootstrap.mount_delay, move || ready.emit()));
        self.globals_due = Some(due);
        self.main = Some(main);

        self.phase = MountPhase::Mounted;
        tracing::info!(time = self.clock.now(), "preloader done, page mounted");
        Ok(())
    }

    fn mount_globals(&mut self) -> Result<()> {
        let handle = self.clock.handle();
        self.globals = Some(sections::mount_globals(&handle, &self.page)?);
        handle.refresh_scroll();
        self.globals_due = None;
        self.phase = MountPhase::Ready;
        tracing::info!(bindings = handle.binding_count(), "page ready");
        Ok(())
    }

    // ========================================================================
    // Host events
    // ========================================================================

    /// Scroll the document; clamped to the scrollable range
    pub fn scroll_to(&mut self, y: f32) {
        let y = y.clamp(0.0, self.page.max_scroll());
        self.clock.handle().scroll_to(y);
    }

    pub fn scroll_by(&mut self, delta: f32) {
        let y = self.clock.handle().viewport().scroll_y + delta;
        self.scroll_to(y);
    }

    /// New viewport size: relayout now, bindings recompute on the next frame
    pub fn resize(&mut self, width: f32, height: f32) {
        self.page.relayout(width, height);
        self.clock.handle().resize(width, height);
    }

    /// Tear a section down; returns whether it was mounted
    pub fn unmount(&mut self, kind: SectionKind) -> bool {
        match self.sections.remove(&kind) {
            Some(scope) => {
                scope.revert();
                tracing::info!(section = %kind, "section unmounted");
                true
            }
            None => false,
        }
    }

    /// Remove an element from the document
    pub fn detach(&mut self, id: &str) -> bool {
        self.page.detach(id)
    }

    pub fn pointer(&mut self, x: f32, y: f32) -> Result<()> {
        if let Some(scope) = &self.interactions {
            sections::pointer_drift(scope, &self.page, x, y)?;
        }
        Ok(())
    }

    pub fn menu(&mut self, open: bool) -> Result<()> {
        if let Some(scope) = &self.interactions {
            sections::toggle_menu(scope, &self.page, open)?;
        }
        Ok(())
    }

    pub fn submit(&mut self) -> Result<()> {
        if let Some(scope) = &self.interactions {
            sections::submit_feedback(scope, &self.page, SUBMIT_DELAY)?;
        }
        Ok(())
    }

    /// Stop everything the page scheduled
    pub fn shutdown(&mut self) {
        self.bootstrap.cancel();
        for (_, scope) in std::mem::take(&mut self.sections) {
            scope.revert();
        }
        for scope in [self.main.take(), self.globals.take(), self.interactions.take()]
            .into_iter()
            .flatten()
        {
            scope.revert();
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Capture state; `ids` limits the element dump (empty means all)
    pub fn snapshot(&self, label: Option<&str>, ids: &[String]) -> PageSnapshot {
        let handle = self.clock.handle();
        let mut elements = BTreeMap::new();
        for node in self.page.tree().iter() {
            let node = node.borrow();
            if !ids.is_empty() && !ids.iter().any(|id| id == node.id()) {
                continue;
            }
            let properties: BTreeMap<String, String> = node
                .properties()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            if !properties.is_empty() || !ids.is_empty() {
                elements.insert(node.id().to_string(), properties);
            }
        }

        PageSnapshot {
            label: label.map(str::to_string),
            frame: self.clock.frame_count(),
            time: self.clock.now(),
            phase: self.phase,
            bootstrap_progress: self.bootstrap.progress(),
            scroll_y: handle.viewport().scroll_y,
            animations: handle.len(),
            active_animations: handle.active_count(),
            bindings: handle.binding_count(),
            mounted_sections: self.sections.keys().copied().collect(),
            elements,
        }
    }

    /// Numeric property of an element
    pub fn number(&self, id: &str, property: &str) -> Option<f32> {
        self.page.node(id)?.borrow().number(property)
    }
}
