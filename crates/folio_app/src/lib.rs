//! Folio Portfolio Host
//!
//! The single-page portfolio wired to the Folio animation engine: a page
//! model with its own layout, section mounts that each own a scope, the
//! preloader gate, `folio.toml` configuration, and a headless scenario runner
//! that reports what the page did frame by frame.
//!
//! # Example
//!
//! ```ignore
//! use folio_app::{FolioConfig, PortfolioApp, runner};
//!
//! let mut app = PortfolioApp::new(FolioConfig::default())?;
//! let report = runner::run_scenario(&mut app, r#"{ "steps": [
//!     { "type": "wait_for", "phase": "ready" },
//!     { "type": "scroll", "y": 1200 },
//!     { "type": "wait", "ms": 1500 },
//!     { "type": "snapshot", "ids": ["bio-text"] }
//! ] }"#)?;
//! report.write_to_writer(&mut std::io::stdout())?;
//! ```

pub mod app;
pub mod assert;
pub mod config;
pub mod page;
pub mod report;
pub mod rng;
pub mod runner;
pub mod scenario;
pub mod sections;

pub use app::{EventTally, MountPhase, PageSnapshot, PortfolioApp};
pub use config::FolioConfig;
pub use page::{PortfolioPage, SectionKind};
pub use report::{ReportStatus, RunReport};
pub use scenario::{Scenario, ScenarioStep};
