//! Lifecycle callbacks
//!
//! Animations never invoke user code while the clock is borrowed. Rendering
//! collects [`Fired`] entries and the clock runs them once the frame's
//! bookkeeping is released, so callbacks may freely call back into the clock.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared no-argument callback
pub type Callback = Rc<RefCell<dyn FnMut()>>;

/// Shared callback receiving the current iteration progress (0.0 to 1.0)
pub type ProgressCallback = Rc<RefCell<dyn FnMut(f64)>>;

pub fn callback<F: FnMut() + 'static>(f: F) -> Callback {
    Rc::new(RefCell::new(f))
}

pub fn progress_callback<F: FnMut(f64) + 'static>(f: F) -> ProgressCallback {
    Rc::new(RefCell::new(f))
}

/// Optional start/update/complete hooks
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_start: Option<Callback>,
    pub on_update: Option<ProgressCallback>,
    pub on_complete: Option<Callback>,
}

impl Callbacks {
    pub(crate) fn start(&self, fired: &mut Vec<Fired>) {
        if let Some(cb) = &self.on_start {
            fired.push(Fired::Plain(cb.clone()));
        }
    }

    pub(crate) fn update(&self, progress: f64, fired: &mut Vec<Fired>) {
        if let Some(cb) = &self.on_update {
            fired.push(Fired::Progress(cb.clone(), progress));
        }
    }

    pub(crate) fn complete(&self, fired: &mut Vec<Fired>) {
        if let Some(cb) = &self.on_complete {
            fired.push(Fired::Plain(cb.clone()));
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// A callback queued during rendering
pub enum Fired {
    Plain(Callback),
    Progress(ProgressCallback, f64),
}

impl Fired {
    /// Run the callback. A callback that is already running (re-entered
    /// through the clock) is skipped.
    pub fn invoke(self) {
        match self {
            Fired::Plain(cb) => match cb.try_borrow_mut() {
                Ok(mut f) => f(),
                Err(_) => tracing::trace!("skipping re-entrant callback"),
            },
            Fired::Progress(cb, progress) => match cb.try_borrow_mut() {
                Ok(mut f) => f(progress),
                Err(_) => tracing::trace!("skipping re-entrant update callback"),
            },
        }
    }
}

/// Run every queued callback in order
pub fn run_all(fired: Vec<Fired>) {
    for entry in fired {
        entry.invoke();
    }
}
