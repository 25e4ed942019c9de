//! Configuration file support for scancrop
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./scancrop.toml` - current directory
//! 3. `~/.config/scancrop/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [detection]
//! whiteness_fraction = 0.95
//! color_closeness = 40.0
//! probe_count = 9
//! strategies = ["majority", "multi-probe"]
//!
//! [background]
//! source = "fixed"
//! color = [250, 250, 250]
//!
//! [output]
//! conform = true
//! preferred_sizes = [[1770, 1180], [1180, 1770]]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::conform::ConformOptions;
use crate::crop::CropOptions;
use crate::edge::{BackgroundSource, DetectionOptions, EdgeStrategy, NEAR_WHITE};

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Edge detection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectionConfig {
    #[serde(default)]
    pub whiteness_fraction: Option<f32>,
    #[serde(default)]
    pub color_closeness: Option<f32>,
    #[serde(default)]
    pub probe_count: Option<u32>,
    #[serde(default)]
    pub min_background_run: Option<u32>,
    #[serde(default)]
    pub min_consensus_support: Option<u32>,
    #[serde(default)]
    pub mode_tolerance: Option<u32>,
    #[serde(default)]
    pub line_margin: Option<u32>,
    #[serde(default)]
    pub probe_start: Option<u32>,
    /// Resolver strategy order
    #[serde(default)]
    pub strategies: Option<Vec<EdgeStrategy>>,
}

/// Background source kind in the config file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundKind {
    #[default]
    Sampled,
    Fixed,
}

/// Background reference settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackgroundConfig {
    #[serde(default)]
    pub source: Option<BackgroundKind>,
    /// Reference color when `source = "fixed"`
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    /// Sampled corner patch size
    #[serde(default)]
    pub patch: Option<u32>,
    /// Noise limit of the sampled patch
    #[serde(default)]
    pub max_noise: Option<f32>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Snap crops to preferred sizes
    #[serde(default)]
    pub conform: Option<bool>,
    #[serde(default)]
    pub preferred_sizes: Option<Vec<(u32, u32)>>,
    #[serde(default)]
    pub conform_distance: Option<f64>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub background: BackgroundConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub whiteness_fraction: Option<f32>,
    pub color_closeness: Option<f32>,
    pub probe_count: Option<u32>,
    pub no_conform: bool,
    pub dry_run: bool,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./scancrop.toml`
    /// 2. `~/.config/scancrop/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        let current_dir_config = PathBuf::from("scancrop.toml");
        if current_dir_config.exists() {
            return Self::load_from_path(&current_dir_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("scancrop").join("config.toml");
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Detection options with file values applied over the defaults
    pub fn to_detection_options(&self) -> DetectionOptions {
        let d = &self.detection;
        let b = &self.background;
        let defaults = DetectionOptions::default();

        let background = match b.source.unwrap_or_default() {
            BackgroundKind::Sampled => BackgroundSource::Sampled,
            BackgroundKind::Fixed => BackgroundSource::Fixed {
                color: b.color.unwrap_or(NEAR_WHITE),
            },
        };

        DetectionOptions {
            whiteness_fraction: d.whiteness_fraction.unwrap_or(defaults.whiteness_fraction),
            color_closeness: d.color_closeness.unwrap_or(defaults.color_closeness),
            probe_count: d.probe_count.unwrap_or(defaults.probe_count),
            min_background_run: d.min_background_run.unwrap_or(defaults.min_background_run),
            min_consensus_support: d
                .min_consensus_support
                .unwrap_or(defaults.min_consensus_support),
            mode_tolerance: d.mode_tolerance.unwrap_or(defaults.mode_tolerance),
            line_margin: d.line_margin.unwrap_or(defaults.line_margin),
            probe_start: d.probe_start.unwrap_or(defaults.probe_start),
            background,
            background_patch: b.patch.unwrap_or(defaults.background_patch),
            max_background_noise: b.max_noise.unwrap_or(defaults.max_background_noise),
            strategies: d.strategies.clone().unwrap_or(defaults.strategies),
        }
    }

    /// Conformance options, `None` when disabled
    pub fn to_conform_options(&self) -> Option<ConformOptions> {
        if !self.output.conform.unwrap_or(true) {
            return None;
        }
        let defaults = ConformOptions::default();
        Some(ConformOptions {
            preferred_sizes: self
                .output
                .preferred_sizes
                .clone()
                .unwrap_or(defaults.preferred_sizes),
            max_distance: self
                .output
                .conform_distance
                .unwrap_or(defaults.max_distance),
        })
    }

    /// Merge config file values with CLI overrides (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> CropOptions {
        let mut detection = self.to_detection_options();
        if let Some(fraction) = cli.whiteness_fraction {
            detection.whiteness_fraction = fraction;
        }
        if let Some(closeness) = cli.color_closeness {
            detection.color_closeness = closeness;
        }
        if let Some(count) = cli.probe_count {
            detection.probe_count = count;
        }

        CropOptions {
            detection,
            conform: if cli.no_conform {
                None
            } else {
                self.to_conform_options()
            },
            dry_run: cli.dry_run,
        }
    }
}
