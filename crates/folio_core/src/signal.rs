//! Completion signals
//!
//! A [`Signal`] is a cloneable latch: producers `emit()`, consumers either
//! poll `is_set()` once per frame or subscribe a listener. Listeners run
//! synchronously inside `emit()`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
struct SignalInner {
    set: Cell<bool>,
    emits: Cell<u32>,
    listeners: RefCell<Vec<Listener>>,
}

/// Shared, single-threaded completion latch
#[derive(Clone, Default)]
pub struct Signal {
    inner: Rc<SignalInner>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latch and notify listeners
    pub fn emit(&self) {
        self.inner.set.set(true);
        self.inner.emits.set(self.inner.emits.get() + 1);

        // Listeners may subscribe more listeners; take the list while running.
        let mut listeners = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        for listener in listeners.iter_mut() {
            listener();
        }
        let mut slot = self.inner.listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }

    /// Whether the signal has been emitted at least once
    pub fn is_set(&self) -> bool {
        self.inner.set.get()
    }

    /// How many times the signal has been emitted
    pub fn emit_count(&self) -> u32 {
        self.inner.emits.get()
    }

    /// Register a listener called on every subsequent emit
    pub fn subscribe<F: FnMut() + 'static>(&self, listener: F) {
        self.inner.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Clear the latch (the emit count is kept)
    pub fn reset(&self) {
        self.inner.set.set(false);
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("set", &self.is_set())
            .field("emits", &self.emit_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_sets_latch_and_counts() {
        let signal = Signal::new();
        assert!(!signal.is_set());

        let observer = signal.clone();
        signal.emit();
        assert!(observer.is_set());
        assert_eq!(observer.emit_count(), 1);
    }

    #[test]
    fn test_listeners_run_on_emit() {
        let signal = Signal::new();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        signal.subscribe(move || hits_clone.set(hits_clone.get() + 1));

        signal.emit();
        signal.emit();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_listener_can_subscribe_during_emit() {
        let signal = Signal::new();
        let inner = signal.clone();
        signal.subscribe(move || inner.subscribe(|| {}));
        signal.emit();
        assert_eq!(signal.inner.listeners.borrow().len(), 2);
    }
}
