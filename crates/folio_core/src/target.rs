//! Animatable targets
//!
//! A target is anything that maps property names to [`Value`]s and accepts
//! writes. The animation engine only ever holds weak references to targets:
//! when the host drops an element, pending writes to it are skipped.

use crate::geometry::Rect;
use crate::value::Value;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Something the engine can animate
pub trait Target {
    /// Current value of a property, `None` if the target never held it
    fn get(&self, property: &str) -> Option<Value>;

    /// Write a property value
    fn set(&mut self, property: &str, value: Value);

    /// Layout box in document space, `None` once detached from the document
    fn bounds(&self) -> Option<Rect> {
        None
    }

    /// Name used in log output
    fn debug_name(&self) -> &str {
        "target"
    }
}

/// Strong, shared handle to a target (owned by the host)
pub type TargetRef = Rc<RefCell<dyn Target>>;

/// Weak handle to a target (held by animations)
pub type WeakTargetRef = Weak<RefCell<dyn Target>>;

/// Resolve a logical reference (a selector, an id, a role) to concrete handles.
///
/// Returning an empty list is valid and means "nothing to animate".
pub trait TargetResolver {
    fn resolve(&self, query: &str) -> Vec<TargetRef>;
}

/// Ordered set of weak target handles
#[derive(Clone, Default)]
pub struct Targets {
    handles: SmallVec<[WeakTargetRef; 1]>,
    /// The query these targets came from, if any
    query: Option<String>,
}

impl Targets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `query` against `resolver`
    pub fn query(resolver: &dyn TargetResolver, query: &str) -> Self {
        let handles = resolver.resolve(query).iter().map(Rc::downgrade).collect();
        Self {
            handles,
            query: Some(query.to_string()),
        }
    }

    pub fn push(&mut self, target: &TargetRef) {
        self.handles.push(Rc::downgrade(target));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn query_str(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeakTargetRef> {
        self.handles.iter()
    }

    /// Split into one single-target set per handle, preserving order
    pub fn split(&self) -> Vec<Targets> {
        self.handles
            .iter()
            .map(|handle| Targets {
                handles: SmallVec::from_elem(handle.clone(), 1),
                query: self.query.clone(),
            })
            .collect()
    }

    /// Upgrade every handle that is still alive
    pub fn upgrade_all(&self) -> Vec<TargetRef> {
        self.handles.iter().filter_map(Weak::upgrade).collect()
    }
}

impl From<&TargetRef> for Targets {
    fn from(target: &TargetRef) -> Self {
        let mut targets = Targets::new();
        targets.push(target);
        targets
    }
}

impl From<&[TargetRef]> for Targets {
    fn from(list: &[TargetRef]) -> Self {
        Self {
            handles: list.iter().map(Rc::downgrade).collect(),
            query: None,
        }
    }
}

impl From<&Vec<TargetRef>> for Targets {
    fn from(list: &Vec<TargetRef>) -> Self {
        Targets::from(list.as_slice())
    }
}

impl From<Vec<TargetRef>> for Targets {
    fn from(list: Vec<TargetRef>) -> Self {
        Targets::from(list.as_slice())
    }
}

impl std::fmt::Debug for Targets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Targets")
            .field("len", &self.handles.len())
            .field("query", &self.query)
            .finish()
    }
}
