//! In-memory render tree
//!
//! A flat, document-ordered list of [`Node`]s addressable by id (`#hero`) or
//! class (`.reveal`). This is the default [`TargetResolver`] used by the host
//! page and by tests; real render trees only need to implement [`Target`].

use crate::geometry::Rect;
use crate::target::{Target, TargetRef, TargetResolver};
use crate::value::Value;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// A single animatable element
#[derive(Debug, Default)]
pub struct Node {
    id: String,
    classes: SmallVec<[String; 2]>,
    properties: FxHashMap<String, Value>,
    bounds: Option<Rect>,
    attached: bool,
    writes: u64,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attached: true,
            ..Default::default()
        }
    }

    /// Builder: add a class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Builder: set layout box
    pub fn at(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Builder: set an initial property
    pub fn with(mut self, property: &str, value: Value) -> Self {
        self.properties.insert(property.to_string(), value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of property writes received so far
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Numeric value of a property, if set
    pub fn number(&self, property: &str) -> Option<f32> {
        self.properties.get(property).and_then(Value::as_f32)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Target for Node {
    fn get(&self, property: &str) -> Option<Value> {
        self.properties.get(property).copied()
    }

    fn set(&mut self, property: &str, value: Value) {
        self.writes += 1;
        self.properties.insert(property.to_string(), value);
    }

    fn bounds(&self) -> Option<Rect> {
        if self.attached {
            self.bounds
        } else {
            None
        }
    }

    fn debug_name(&self) -> &str {
        &self.id
    }
}

/// Document-ordered collection of nodes
#[derive(Default)]
pub struct NodeTree {
    nodes: Vec<Rc<RefCell<Node>>>,
    by_id: FxHashMap<String, usize>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; returns its shared handle
    pub fn insert(&mut self, node: Node) -> Rc<RefCell<Node>> {
        let id = node.id.clone();
        let handle = Rc::new(RefCell::new(node));
        self.by_id.insert(id, self.nodes.len());
        self.nodes.push(handle.clone());
        handle
    }

    pub fn get(&self, id: &str) -> Option<Rc<RefCell<Node>>> {
        self.by_id.get(id).map(|&index| self.nodes[index].clone())
    }

    /// Remove a node from the document.
    ///
    /// The node is marked detached (its bounds disappear) and the tree drops
    /// its strong reference. Returns false if no such node exists.
    pub fn detach(&mut self, id: &str) -> bool {
        let Some(index) = self.by_id.remove(id) else {
            return false;
        };
        let node = self.nodes.remove(index);
        node.borrow_mut().attached = false;
        for slot in self.by_id.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        tracing::debug!("node `{}` detached", id);
        true
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<RefCell<Node>>> {
        self.nodes.iter()
    }

    /// Nodes matching a selector, in document order.
    ///
    /// Supported forms: `#id`, `.class`, and a comma separated list of those.
    pub fn select(&self, selector: &str) -> Vec<Rc<RefCell<Node>>> {
        let parts: SmallVec<[&str; 4]> = selector
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        self.nodes
            .iter()
            .filter(|node| {
                let node = node.borrow();
                parts.iter().any(|part| matches_selector(&node, part))
            })
            .cloned()
            .collect()
    }
}

fn matches_selector(node: &Node, selector: &str) -> bool {
    if let Some(id) = selector.strip_prefix('#') {
        node.id == id
    } else if let Some(class) = selector.strip_prefix('.') {
        node.has_class(class)
    } else {
        node.id == selector
    }
}

impl TargetResolver for NodeTree {
    fn resolve(&self, query: &str) -> Vec<TargetRef> {
        self.select(query)
            .into_iter()
            .map(|node| node as TargetRef)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> NodeTree {
        let mut tree = NodeTree::new();
        tree.insert(Node::new("hero").class("section"));
        tree.insert(Node::new("a").class("skill-item").class("reveal"));
        tree.insert(Node::new("b").class("skill-item"));
        tree.insert(Node::new("c").class("skill-item"));
        tree
    }

    #[test]
    fn test_select_by_class_in_document_order() {
        let tree = tree();
        let ids: Vec<String> = tree
            .select(".skill-item")
            .iter()
            .map(|n| n.borrow().id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_select_by_id_and_list() {
        let tree = tree();
        assert_eq!(tree.select("#hero").len(), 1);
        assert_eq!(tree.select("#hero, .reveal").len(), 2);
        assert!(tree.select(".missing").is_empty());
    }

    #[test]
    fn test_detach_clears_bounds() {
        let mut tree = NodeTree::new();
        let node = tree.insert(Node::new("card").at(Rect::new(0.0, 100.0, 10.0, 10.0)));
        assert!(node.borrow().bounds().is_some());

        assert!(tree.detach("card"));
        assert!(node.borrow().bounds().is_none());
        assert!(tree.get("card").is_none());
        assert!(!tree.detach("card"));
    }

    #[test]
    fn test_detach_keeps_index_consistent() {
        let mut tree = tree();
        tree.detach("a");
        assert_eq!(tree.get("c").unwrap().borrow().id(), "c");
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_writes_are_counted() {
        let mut node = Node::new("n");
        node.set("opacity", Value::number(0.5));
        node.set("opacity", Value::number(0.6));
        assert_eq!(node.write_count(), 2);
        assert_eq!(node.number("opacity"), Some(0.6));
    }
}
