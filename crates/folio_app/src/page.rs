//! The portfolio page as a node tree
//!
//! Folio has no layout engine, so the page lays itself out: sections are
//! stacked top to bottom, the hero fills the first screen, and every element
//! sits at a fixed offset inside its section. Fixed overlays (preloader,
//! navigation, orbs, mobile menu) are positioned against the viewport.

use crate::config::PageConfig;
use folio_core::{Node, NodeTree, Rect, TargetRef, TargetResolver, Value, Viewport};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Page sections that mount and unmount as a unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Navigation,
    Orbs,
    Hero,
    About,
    Projects,
    Contact,
    Footer,
}

impl SectionKind {
    /// Document order
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Navigation,
        SectionKind::Orbs,
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Projects,
        SectionKind::Contact,
        SectionKind::Footer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Navigation => "navigation",
            SectionKind::Orbs => "orbs",
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Projects => "projects",
            SectionKind::Contact => "contact",
            SectionKind::Footer => "footer",
        }
    }

    /// Height of the section in document flow; `None` for overlays
    fn flow_height(self, viewport: &Viewport) -> Option<f32> {
        match self {
            SectionKind::Navigation | SectionKind::Orbs => None,
            SectionKind::Hero => Some(viewport.height),
            SectionKind::About => Some(1400.0),
            SectionKind::Projects => Some(1600.0),
            SectionKind::Contact => Some(1100.0),
            SectionKind::Footer => Some(500.0),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown section `{s}`"))
    }
}

/// Where an element sits
#[derive(Clone, Copy, Debug)]
enum Anchor {
    /// Against the viewport, independent of scroll
    Fixed,
    /// Offset from the top of a flow section
    Section(SectionKind),
}

#[derive(Clone, Debug)]
struct Slot {
    id: String,
    anchor: Anchor,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// The page: a node tree plus the rules that lay it out
pub struct PortfolioPage {
    tree: NodeTree,
    slots: Vec<Slot>,
    viewport: Viewport,
    section_tops: Vec<(SectionKind, f32)>,
    document_height: f32,
}

impl PortfolioPage {
    pub fn new(config: &PageConfig, viewport: Viewport) -> Self {
        let mut page = Self {
            tree: NodeTree::new(),
            slots: Vec::new(),
            viewport,
            section_tops: Vec::new(),
            document_height: 0.0,
        };
        page.populate(config);
        page.relayout(viewport.width, viewport.height);
        page
    }

    // ========================================================================
    // Content
    // ========================================================================

    fn populate(&mut self, config: &PageConfig) {
        use SectionKind::*;

        // Preloader overlay
        self.place(Node::new("preloader").class("preloader"), Anchor::Fixed, 0.0, 0.0, 1.0, 1.0);
        self.place(Node::new("loading-logo").class("loading-logo"), Anchor::Fixed, 0.4, 0.3, 0.2, 0.15);
        self.place(Node::new("loading-text").class("loading-text"), Anchor::Fixed, 0.3, 0.5, 0.4, 0.05);
        self.place(Node::new("progress-bar").class("progress-bar"), Anchor::Fixed, 0.3, 0.6, 0.4, 0.01);
        self.place(Node::new("loading-progress"), Anchor::Fixed, 0.45, 0.63, 0.1, 0.04);

        // Navigation
        self.place(Node::new("nav").class("nav-container"), Anchor::Fixed, 0.0, 0.0, 1.0, 0.1);
        self.place(
            Node::new("mobile-menu")
                .class("mobile-menu")
                .with("visible", Value::number(0.0)),
            Anchor::Fixed,
            0.0,
            0.1,
            1.0,
            0.6,
        );
        for (index, label) in ["home", "about", "projects", "contact"].iter().enumerate() {
            self.place(
                Node::new(format!("menu-{label}")).class("mobile-menu-item"),
                Anchor::Fixed,
                0.1,
                0.15 + index as f32 * 0.1,
                0.8,
                0.08,
            );
        }

        // Shell that every section lives in
        self.place(Node::new("main-content").class("main-content"), Anchor::Fixed, 0.0, 0.0, 1.0, 1.0);

        for index in 0..config.orb_count {
            self.place(
                Node::new(format!("orb-{index}")).class("floating-orb"),
                Anchor::Fixed,
                0.0,
                0.0,
                0.2,
                0.2,
            );
        }

        // Hero
        self.flow(Node::new("hero-backdrop").class("parallax"), Hero, 0.0, 0.0, 1280.0, 720.0);
        self.flow(Node::new("hero-headline").class("hero-headline"), Hero, 120.0, 180.0, 800.0, 120.0);
        self.flow(Node::new("hero-subtitle").class("hero-subtitle"), Hero, 120.0, 320.0, 700.0, 60.0);
        self.flow(Node::new("hero-buttons").class("hero-buttons"), Hero, 120.0, 410.0, 400.0, 56.0);
        self.flow(Node::new("spline").class("spline-container"), Hero, 700.0, 120.0, 500.0, 500.0);

        // About
        self.flow(Node::new("profile-image").class("profile-image"), About, 120.0, 160.0, 400.0, 400.0);
        self.flow(Node::new("bio-text").class("bio-text"), About, 600.0, 160.0, 560.0, 400.0);
        self.flow(Node::new("about-divider").class("reveal"), About, 120.0, 620.0, 1040.0, 4.0);
        self.flow(Node::new("skills-grid").class("skills-grid"), About, 120.0, 700.0, 1040.0, 560.0);
        for (index, level) in config.skill_levels.iter().enumerate() {
            let row = 700.0 + (index / 2) as f32 * 140.0;
            let column = 120.0 + (index % 2) as f32 * 540.0;
            self.flow(
                Node::new(format!("skill-{index}")).class("skill-item"),
                About,
                column,
                row,
                500.0,
                120.0,
            );
            self.flow(
                Node::new(format!("skill-progress-{index}"))
                    .class("skill-progress")
                    .with("level", Value::number(*level)),
                About,
                column,
                row + 90.0,
                500.0,
                8.0,
            );
        }

        // Projects
        self.flow(Node::new("projects-title").class("projects-title"), Projects, 120.0, 120.0, 1040.0, 80.0);
        self.flow(Node::new("projects-grid").class("projects-grid"), Projects, 120.0, 260.0, 1040.0, 1200.0);
        for index in 0..config.project_count {
            self.flow(
                Node::new(format!("project-{index}")).class("project-card"),
                Projects,
                120.0 + (index % 3) as f32 * 350.0,
                260.0 + (index / 3) as f32 * 420.0,
                330.0,
                400.0,
            );
        }
        self.flow(Node::new("projects-divider").class("reveal"), Projects, 120.0, 1500.0, 1040.0, 4.0);

        // Contact
        self.flow(Node::new("contact-title").class("contact-title"), Contact, 120.0, 120.0, 1040.0, 80.0);
        self.flow(Node::new("contact-form").class("contact-form"), Contact, 120.0, 260.0, 600.0, 640.0);
        self.flow(Node::new("contact-info").class("contact-info"), Contact, 780.0, 260.0, 380.0, 640.0);
        for (index, field) in ["name", "email", "message"].iter().enumerate() {
            self.flow(
                Node::new(format!("input-{field}")).class("form-input"),
                Contact,
                120.0,
                260.0 + index as f32 * 140.0,
                600.0,
                100.0,
            );
        }
        self.flow(Node::new("submit").class("submit-btn"), Contact, 120.0, 700.0, 600.0, 56.0);

        // Footer
        self.flow(Node::new("footer-content").class("footer-content"), Footer, 120.0, 80.0, 1040.0, 320.0);
        for index in 0..config.particle_count {
            self.flow(
                Node::new(format!("particle-{index}")).class("footer-particle"),
                Footer,
                160.0 + index as f32 * 200.0,
                420.0,
                8.0,
                8.0,
            );
        }
    }

    /// Viewport-relative element; the box is in fractions of the viewport
    fn place(&mut self, node: Node, anchor: Anchor, x: f32, y: f32, width: f32, height: f32) {
        self.push(node, anchor, x, y, width, height);
    }

    /// Element in document flow; the box is in pixels from the section top
    fn flow(&mut self, node: Node, section: SectionKind, x: f32, y: f32, width: f32, height: f32) {
        self.push(node, Anchor::Section(section), x, y, width, height);
    }

    fn push(&mut self, node: Node, anchor: Anchor, x: f32, y: f32, width: f32, height: f32) {
        self.slots.push(Slot {
            id: node.id().to_string(),
            anchor,
            x,
            y,
            width,
            height,
        });
        self.tree.insert(node);
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Recompute every box for a new viewport size
    pub fn relayout(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;

        let mut top = 0.0;
        self.section_tops.clear();
        for kind in SectionKind::ALL {
            if let Some(section_height) = kind.flow_height(&self.viewport) {
                self.section_tops.push((kind, top));
                top += section_height;
            }
        }
        self.document_height = top;

        for slot in &self.slots {
            let Some(node) = self.tree.get(&slot.id) else {
                continue;
            };
            let bounds = match slot.anchor {
                Anchor::Fixed => Rect::new(
                    slot.x * width,
                    slot.y * height,
                    slot.width * width,
                    slot.height * height,
                ),
                Anchor::Section(kind) => {
                    let section_top = self.section_top(kind).unwrap_or(0.0);
                    Rect::new(slot.x, section_top + slot.y, slot.width, slot.height)
                }
            };
            node.borrow_mut().set_bounds(bounds);
        }
        tracing::debug!(width, height, document_height = top, "page laid out");
    }

    /// Document y of a flow section's top edge
    pub fn section_top(&self, kind: SectionKind) -> Option<f32> {
        self.section_tops
            .iter()
            .find(|(section, _)| *section == kind)
            .map(|(_, top)| *top)
    }

    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    /// Largest meaningful scroll offset
    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.viewport.height).max(0.0)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn node(&self, id: &str) -> Option<Rc<RefCell<Node>>> {
        self.tree.get(id)
    }

    /// Shared handle to a node as an animation target
    pub fn target(&self, id: &str) -> Option<TargetRef> {
        self.node(id).map(|node| node as TargetRef)
    }

    /// Remove an element from the document
    pub fn detach(&mut self, id: &str) -> bool {
        self.tree.detach(id)
    }

    /// Drop the preloader overlay once it has faded out
    pub fn remove_preloader(&mut self) {
        let ids: Vec<String> = self
            .tree
            .select(".preloader, .loading-logo, .loading-text, .progress-bar, #loading-progress")
            .iter()
            .map(|node| node.borrow().id().to_string())
            .collect();
        for id in ids {
            self.tree.detach(&id);
        }
    }
}

impl TargetResolver for PortfolioPage {
    fn resolve(&self, query: &str) -> Vec<TargetRef> {
        self.tree.resolve(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Target;

    fn page() -> PortfolioPage {
        PortfolioPage::new(&PageConfig::default(), Viewport::new(1280.0, 720.0))
    }

    #[test]
    fn test_sections_stack_in_document_order() {
        let page = page();
        assert_eq!(page.section_top(SectionKind::Hero), Some(0.0));
        assert_eq!(page.section_top(SectionKind::About), Some(720.0));
        assert_eq!(page.section_top(SectionKind::Projects), Some(2120.0));
        assert_eq!(page.section_top(SectionKind::Navigation), None);
        assert_eq!(page.document_height(), 720.0 + 1400.0 + 1600.0 + 1100.0 + 500.0);
    }

    #[test]
    fn test_resize_moves_flow_content() {
        let mut page = page();
        let before = page.node("bio-text").unwrap().borrow().bounds().unwrap();
        page.relayout(1280.0, 900.0);
        let after = page.node("bio-text").unwrap().borrow().bounds().unwrap();
        assert_eq!(after.y - before.y, 180.0);

        let preloader = page.node("preloader").unwrap().borrow().bounds().unwrap();
        assert_eq!(preloader.height, 900.0);
    }

    #[test]
    fn test_counts_follow_config() {
        let page = page();
        assert_eq!(page.tree().select(".skill-item").len(), 8);
        assert_eq!(page.tree().select(".skill-progress").len(), 8);
        assert_eq!(page.tree().select(".project-card").len(), 6);
        assert_eq!(page.tree().select(".floating-orb").len(), 10);
        assert_eq!(page.tree().select(".footer-particle").len(), 5);
        assert_eq!(
            page.node("skill-progress-2").unwrap().borrow().number("level"),
            Some(88.0)
        );
    }

    #[test]
    fn test_remove_preloader() {
        let mut page = page();
        let logo = page.node("loading-logo").unwrap();
        page.remove_preloader();
        assert!(page.node("preloader").is_none());
        assert!(page.node("loading-progress").is_none());
        assert!(!logo.borrow().is_attached());
        assert!(page.node("hero-headline").is_some());
    }

    #[test]
    fn test_section_names() {
        assert_eq!("footer".parse::<SectionKind>(), Ok(SectionKind::Footer));
        assert!("sidebar".parse::<SectionKind>().is_err());
        assert_eq!(SectionKind::About.to_string(), "about");
    }
}
