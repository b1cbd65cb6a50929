//! Folio configuration file handling

use anyhow::{bail, Context, Result};
use folio_animation::{BootstrapConfig, Easing, MotionPreference};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration (folio.toml)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub bootstrap: BootstrapSection,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub page: PageConfig,
    /// Fallback filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            clock: ClockConfig::default(),
            bootstrap: BootstrapSection::default(),
            motion: MotionConfig::default(),
            page: PageConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Initial viewport size in logical pixels
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    720.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Frame pacing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClockConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Global speed multiplier
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_fps() -> u32 {
    60
}

fn default_time_scale() -> f64 {
    1.0
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            time_scale: default_time_scale(),
        }
    }
}

/// Preloader timings (seconds) and easing names
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BootstrapSection {
    #[serde(default = "default_progress_duration")]
    pub progress_duration: f64,
    #[serde(default = "default_progress_ease")]
    pub progress_ease: String,
    #[serde(default = "default_logo_duration")]
    pub logo_duration: f64,
    #[serde(default = "default_text_offset")]
    pub text_offset: f64,
    #[serde(default = "default_text_duration")]
    pub text_duration: f64,
    #[serde(default = "default_dwell")]
    pub dwell: f64,
    #[serde(default = "default_bar_exit_duration")]
    pub bar_exit_duration: f64,
    #[serde(default = "default_preloader_exit_duration")]
    pub preloader_exit_duration: f64,
    #[serde(default = "default_exit_overlap")]
    pub exit_overlap: f64,
    /// Delay between the main content mounting and the global scroll
    /// bindings being installed
    #[serde(default = "default_mount_delay")]
    pub mount_delay: f64,
}

fn default_progress_duration() -> f64 {
    2.5
}

fn default_progress_ease() -> String {
    "power2.out".to_string()
}

fn default_logo_duration() -> f64 {
    1.0
}

fn default_text_offset() -> f64 {
    0.5
}

fn default_text_duration() -> f64 {
    0.8
}

fn default_dwell() -> f64 {
    0.8
}

fn default_bar_exit_duration() -> f64 {
    0.5
}

fn default_preloader_exit_duration() -> f64 {
    1.0
}

fn default_exit_overlap() -> f64 {
    0.3
}

fn default_mount_delay() -> f64 {
    0.1
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            progress_duration: default_progress_duration(),
            progress_ease: default_progress_ease(),
            logo_duration: default_logo_duration(),
            text_offset: default_text_offset(),
            text_duration: default_text_duration(),
            dwell: default_dwell(),
            bar_exit_duration: default_bar_exit_duration(),
            preloader_exit_duration: default_preloader_exit_duration(),
            exit_overlap: default_exit_overlap(),
            mount_delay: default_mount_delay(),
        }
    }
}

/// Motion preference
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MotionConfig {
    /// Collapse non-essential animations to their end state
    #[serde(default)]
    pub reduced: bool,
}

/// Page content sizes
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PageConfig {
    #[serde(default = "default_orb_count")]
    pub orb_count: usize,
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    #[serde(default = "default_project_count")]
    pub project_count: usize,
    /// One progress bar per entry, filled to this percentage
    #[serde(default = "default_skill_levels")]
    pub skill_levels: Vec<f32>,
    /// Seed for orb placement and drift
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_orb_count() -> usize {
    10
}

fn default_particle_count() -> usize {
    5
}

fn default_project_count() -> usize {
    6
}

fn default_skill_levels() -> Vec<f32> {
    vec![95.0, 90.0, 88.0, 95.0, 92.0, 85.0, 90.0, 80.0]
}

fn default_seed() -> u64 {
    0x5eed_f011_0000_0001
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            orb_count: default_orb_count(),
            particle_count: default_particle_count(),
            project_count: default_project_count(),
            skill_levels: default_skill_levels(),
            seed: default_seed(),
        }
    }
}

impl FolioConfig {
    /// Load configuration from a file, or from `folio.toml` in a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("folio.toml")
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            bail!("No configuration found at {}", config_path.display());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: FolioConfig = toml::from_str(input).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot honor
    pub fn validate(&self) -> Result<()> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            bail!(
                "viewport must be non-empty (got {}x{})",
                self.viewport.width,
                self.viewport.height
            );
        }
        if self.clock.fps == 0 {
            bail!("clock.fps must be > 0");
        }
        if !(self.clock.time_scale.is_finite() && self.clock.time_scale >= 0.0) {
            bail!("clock.time_scale must be a non-negative number");
        }
        if !(self.bootstrap.mount_delay.is_finite() && self.bootstrap.mount_delay >= 0.0) {
            bail!("bootstrap.mount_delay must be a non-negative number");
        }
        if let Some(level) = self
            .page
            .skill_levels
            .iter()
            .find(|level| !(0.0..=100.0).contains(*level))
        {
            bail!("skill levels must lie in 0..=100 (got {level})");
        }
        self.bootstrap_config()?;
        Ok(())
    }

    /// Engine-side bootstrap timings
    pub fn bootstrap_config(&self) -> Result<BootstrapConfig> {
        let section = &self.bootstrap;
        let progress_ease: Easing = section
            .progress_ease
            .parse()
            .with_context(|| format!("bootstrap.progress_ease `{}`", section.progress_ease))?;

        Ok(BootstrapConfig {
            progress_duration: section.progress_duration,
            progress_ease,
            logo_duration: section.logo_duration,
            text_offset: section.text_offset,
            text_duration: section.text_duration,
            dwell: section.dwell,
            bar_exit_duration: section.bar_exit_duration,
            preloader_exit_duration: section.preloader_exit_duration,
            exit_overlap: section.exit_overlap,
        })
    }

    /// Seconds between frames
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.clock.fps.max(1))
    }

    pub fn motion_preference(&self) -> MotionPreference {
        if self.motion.reduced {
            MotionPreference::Reduced
        } else {
            MotionPreference::Full
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FolioConfig::from_toml_str("").unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.viewport.width, 1280.0);
        assert_eq!(config.page.skill_levels.len(), 8);
        assert_eq!(config.motion_preference(), MotionPreference::Full);
    }

    #[test]
    fn test_partial_sections() {
        let config = FolioConfig::from_toml_str(
            r#"
            log_level = "debug"

            [clock]
            fps = 30

            [bootstrap]
            dwell = 0.2
            progress_ease = "power3.out"

            [motion]
            reduced = true
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert!((config.frame_interval() - 1.0 / 30.0).abs() < 1e-12);
        assert_eq!(config.clock.time_scale, 1.0);
        assert_eq!(config.motion_preference(), MotionPreference::Reduced);

        let bootstrap = config.bootstrap_config().unwrap();
        assert_eq!(bootstrap.dwell, 0.2);
        assert_eq!(bootstrap.progress_ease, Easing::EaseOutQuart);
        assert_eq!(bootstrap.progress_duration, 2.5);
    }

    #[test]
    fn test_validation_errors() {
        assert!(FolioConfig::from_toml_str("[clock]\nfps = 0").is_err());
        assert!(FolioConfig::from_toml_str("[viewport]\nwidth = 0.0").is_err());
        assert!(FolioConfig::from_toml_str("[page]\nskill_levels = [50.0, 120.0]").is_err());

        let err = FolioConfig::from_toml_str("[bootstrap]\nprogress_ease = \"wobble\"").unwrap_err();
        assert!(format!("{err:#}").contains("wobble"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FolioConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(FolioConfig::from_toml_str(&text).unwrap(), config);
    }
}
