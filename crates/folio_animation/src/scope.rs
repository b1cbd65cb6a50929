//! Lifecycle scopes
//!
//! A [`Scope`] records every animation and scroll binding created while it is
//! entered (or added through it directly) and can revert all of them in one
//! synchronous call. Hosts open a scope when a component mounts and revert it
//! when the component goes away; after `revert()` returns, nothing the scope
//! owned will write to a target again.

use crate::animation::Animation;
use crate::clock::{AnimationId, ClockHandle};
use crate::error::{AnimationError, Result};
use crate::scroll::{BindingId, ScrollTrigger};
use slotmap::new_key_type;

new_key_type! {
    pub struct ScopeId;
}

/// Ownership record kept by the clock
#[derive(Debug, Default)]
pub(crate) struct ScopeRecord {
    pub(crate) name: String,
    pub(crate) animations: Vec<AnimationId>,
    pub(crate) bindings: Vec<BindingId>,
    pub(crate) reverted: bool,
}

/// A lifecycle-bound group of animations and bindings
#[derive(Clone, Debug)]
pub struct Scope {
    id: ScopeId,
    clock: ClockHandle,
}

impl Scope {
    /// Open a new, empty scope on `clock`
    pub fn open(clock: &ClockHandle) -> Scope {
        Scope::named(clock, "scope")
    }

    pub fn named(clock: &ClockHandle, name: &str) -> Scope {
        let id = clock
            .update(|inner, _| {
                inner.scopes.insert(ScopeRecord {
                    name: name.to_string(),
                    ..Default::default()
                })
            })
            .unwrap_or_default();
        tracing::debug!(?id, name, "scope opened");
        Scope {
            id,
            clock: clock.clone(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    pub fn name(&self) -> String {
        self.clock
            .read(|inner| inner.scopes.get(self.id).map(|record| record.name.clone()))
            .flatten()
            .unwrap_or_default()
    }

    /// Whether `revert()` has run (a scope on a dropped clock counts as reverted)
    pub fn is_reverted(&self) -> bool {
        self.clock
            .read(|inner| inner.scopes.get(self.id).map(|record| record.reverted))
            .flatten()
            .unwrap_or(true)
    }

    /// Make this the active scope until the guard is dropped.
    ///
    /// Entering a reverted scope records nothing.
    pub fn enter(&self) -> ScopeGuard {
        let pushed = !self.is_reverted()
            && self
                .clock
                .update(|inner, _| inner.scope_stack.push(self.id))
                .is_some();
        ScopeGuard {
            id: self.id,
            clock: self.clock.clone(),
            pushed,
        }
    }

    /// Run `f` with this scope active
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }

    /// Schedule an animation owned by this scope.
    ///
    /// On a reverted scope nothing is scheduled and a null id is returned.
    pub fn add(&self, animation: impl Into<Animation>) -> AnimationId {
        if self.is_reverted() {
            tracing::warn!(scope = ?self.id, "{}", AnimationError::AlreadyReverted);
            return AnimationId::default();
        }
        self.run(|| self.clock.add(animation))
    }

    /// Schedule a fire-and-forget animation owned by this scope; it leaves
    /// the clock (and the scope) once it completes
    pub fn add_transient(&self, animation: impl Into<Animation>) -> AnimationId {
        if self.is_reverted() {
            tracing::warn!(scope = ?self.id, "{}", AnimationError::AlreadyReverted);
            return AnimationId::default();
        }
        self.run(|| self.clock.add_transient(animation))
    }

    /// Schedule a paused animation owned by this scope
    pub fn add_paused(&self, animation: impl Into<Animation>) -> AnimationId {
        if self.is_reverted() {
            tracing::warn!(scope = ?self.id, "{}", AnimationError::AlreadyReverted);
            return AnimationId::default();
        }
        self.run(|| self.clock.add_paused(animation))
    }

    /// Attach a scroll binding owned by this scope
    pub fn attach_scroll(&self, animation: AnimationId, trigger: ScrollTrigger) -> Result<BindingId> {
        if self.is_reverted() {
            tracing::warn!(scope = ?self.id, "{}", AnimationError::AlreadyReverted);
            return Ok(BindingId::default());
        }
        self.run(|| self.clock.attach_scroll(animation, trigger))
    }

    /// Kill every owned animation (no callbacks) and unregister every owned
    /// binding. Idempotent.
    pub fn revert(&self) {
        self.clock.update(|inner, _| {
            let Some(record) = inner.scopes.get_mut(self.id) else {
                return;
            };
            if record.reverted {
                tracing::trace!(scope = ?self.id, "scope already reverted");
                return;
            }
            record.reverted = true;
            let animations = std::mem::take(&mut record.animations);
            let bindings = std::mem::take(&mut record.bindings);
            let name = record.name.clone();

            for binding in &bindings {
                inner.remove_binding(*binding);
            }
            let killed = animations
                .iter()
                .filter(|id| inner.kill_entry(**id))
                .count();
            inner.scope_stack.retain(|open| *open != self.id);

            tracing::debug!(scope = %name, killed, bindings = bindings.len(), "scope reverted");
        });
    }

    /// Owned animations that are still scheduled
    pub fn animations(&self) -> Vec<AnimationId> {
        self.clock
            .read(|inner| {
                inner.scopes.get(self.id).map(|record| {
                    record
                        .animations
                        .iter()
                        .copied()
                        .filter(|id| inner.contains(*id))
                        .collect()
                })
            })
            .flatten()
            .unwrap_or_default()
    }

    /// Owned bindings that are still installed
    pub fn bindings(&self) -> Vec<BindingId> {
        self.clock
            .read(|inner| {
                inner.scopes.get(self.id).map(|record| {
                    record
                        .bindings
                        .iter()
                        .copied()
                        .filter(|id| inner.bindings.contains_key(*id))
                        .collect()
                })
            })
            .flatten()
            .unwrap_or_default()
    }
}

/// Keeps a scope active; pops it when dropped
pub struct ScopeGuard {
    id: ScopeId,
    clock: ClockHandle,
    pushed: bool,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if !self.pushed {
            return;
        }
        let id = self.id;
        self.clock.update(|inner, _| {
            if let Some(position) = inner.scope_stack.iter().rposition(|open| *open == id) {
                inner.scope_stack.remove(position);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{AnimationClock, AnimationState};
    use crate::tween::Tween;
    use folio_core::{Node, TargetRef};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn fade(target: &TargetRef) -> Tween {
        Tween::build(target)
            .from_to("opacity", 0.0, 1.0)
            .duration(1.0)
            .finish()
            .unwrap()
    }

    #[test]
    fn test_records_animations_created_inside() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let target: TargetRef = Rc::new(RefCell::new(Node::new("a")));

        let scope = Scope::open(&handle);
        let inside = scope.run(|| handle.add(fade(&target)));
        let outside = handle.add(fade(&target));

        assert_eq!(scope.animations(), vec![inside]);
        scope.revert();
        assert_eq!(handle.state(inside), AnimationState::Killed);
        assert_eq!(handle.state(outside), AnimationState::Pending);
    }

    #[test]
    fn test_revert_is_idempotent_and_silent() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let node = Rc::new(RefCell::new(Node::new("a")));
        let target: TargetRef = node.clone();

        let completed = Rc::new(Cell::new(false));
        let flag = completed.clone();
        let scope = Scope::open(&handle);
        let id = scope.add(
            Tween::build(&target)
                .to("x", 100.0)
                .duration(1.0)
                .on_complete(move || flag.set(true))
                .finish()
                .unwrap(),
        );
        clock.advance(0.0);
        clock.advance(0.5);

        scope.revert();
        scope.revert();
        assert!(scope.is_reverted());
        let writes = node.borrow().write_count();

        handle.play(id);
        handle.seek(id, 1.0);
        clock.advance(2.0);
        assert_eq!(node.borrow().write_count(), writes);
        assert!(!completed.get());
    }

    #[test]
    fn test_reverted_scope_rejects_new_work() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let target: TargetRef = Rc::new(RefCell::new(Node::new("a")));

        let scope = Scope::open(&handle);
        scope.revert();
        let id = scope.add(fade(&target));
        assert_eq!(handle.state(id), AnimationState::Killed);
        assert!(handle.is_empty());

        // Entering a reverted scope does not capture later work
        let later = scope.run(|| handle.add(fade(&target)));
        assert!(scope.animations().is_empty());
        assert_eq!(handle.state(later), AnimationState::Pending);
    }

    #[test]
    fn test_transient_work_leaves_the_scope() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let target: TargetRef = Rc::new(RefCell::new(Node::new("a")));

        let scope = Scope::open(&handle);
        let kept = scope.add(fade(&target));
        let transient = scope.add_transient(fade(&target));
        assert_eq!(scope.animations(), vec![kept, transient]);

        clock.advance(0.0);
        clock.advance(5.0);
        assert_eq!(scope.animations(), vec![kept]);
        assert!(handle.is_complete(transient));

        scope.revert();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_nested_scopes_record_innermost() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let target: TargetRef = Rc::new(RefCell::new(Node::new("a")));

        let outer = Scope::named(&handle, "page");
        let inner = Scope::named(&handle, "section");
        let (a, b) = outer.run(|| {
            let a = handle.add(fade(&target));
            let b = inner.run(|| handle.add(fade(&target)));
            (a, b)
        });
        assert_eq!(outer.animations(), vec![a]);
        assert_eq!(inner.animations(), vec![b]);
        assert_eq!(inner.name(), "section");
    }
}
