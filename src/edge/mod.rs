//! Scanner Margin Edge Detection module
//!
//! Finds where a scanned photograph ends and the scanner background begins.
//! The photograph is assumed to sit at the top-left of the scan, so only the
//! right edge (swept over columns) and the bottom edge (swept over rows) are
//! searched.
//!
//! # Strategies
//!
//! - **Majority** ([`find_edge_by_majority`]) - sweep lines inward until one is
//!   not mostly background
//! - **Single probe** ([`probe_transition`]) - follow one line from the photo
//!   toward the margin
//! - **Multi probe** ([`aggregate_transitions`]) - mode of many parallel probes
//!
//! [`resolve_edge`] tries them in the configured order per axis.
//!
//! # Example
//!
//! ```rust
//! use image::{Rgb, RgbImage};
//! use scancrop::{detect_crop_rectangle, DetectionOptions};
//!
//! let img = RgbImage::from_fn(100, 100, |x, y| {
//!     if x < 80 && y < 80 { Rgb([90, 60, 30]) } else { Rgb([250, 250, 250]) }
//! });
//!
//! let detection = detect_crop_rectangle(&img, &DetectionOptions::default()).unwrap();
//! assert_eq!((detection.rectangle.right, detection.rectangle.bottom), (80, 80));
//! ```

// Submodules
mod aggregate;
mod background;
mod line;
mod majority;
mod probe;
mod resolve;
mod types;

// Re-export public API
pub use aggregate::{aggregate_transitions, mode_of, probe_lines};
pub use background::derive_background;
pub use line::{classify_line, Line};
pub use majority::find_edge_by_majority;
pub use probe::probe_transition;
pub use resolve::{
    detect_crop_rectangle, resolve_edge, CropDetection, EdgeEstimator, EdgeResolution,
    EdgeStrategy,
};
pub use types::{
    rgb_distance, Axis, BackgroundColor, CropRectangle, EdgeError, LineVerdict, Result,
};

// ============================================================
// Constants
// ============================================================

/// Default fraction of background pixels for a line to count as background
const DEFAULT_WHITENESS_FRACTION: f32 = 0.95;

/// Whiteness fraction for scans with a very clean background
const STRICT_WHITENESS_FRACTION: f32 = 0.99;

/// Whiteness fraction for dusty or speckled scanner glass
const TOLERANT_WHITENESS_FRACTION: f32 = 0.90;

/// Default RGB distance for a pixel to count as background
const DEFAULT_COLOR_CLOSENESS: f32 = 40.0;

/// Color closeness for scans with uneven background
const TOLERANT_COLOR_CLOSENESS: f32 = 60.0;

/// Default number of parallel probe lines
const DEFAULT_PROBE_COUNT: u32 = 9;

/// Default background run length confirming a transition
const DEFAULT_MIN_BACKGROUND_RUN: u32 = 8;

/// Default number of agreeing probes for the mode to be trusted
const DEFAULT_MIN_CONSENSUS_SUPPORT: u32 = 2;

/// Default bucket width when counting probe transitions
const DEFAULT_MODE_TOLERANCE: u32 = 2;

/// Default side length of the sampled background corner patch
const DEFAULT_BACKGROUND_PATCH: u32 = 8;

/// Default per-channel standard deviation allowed in the background patch
const DEFAULT_MAX_BACKGROUND_NOISE: f32 = 12.0;

/// Near-white reference used by [`BackgroundSource::Fixed`] presets
pub const NEAR_WHITE: [u8; 3] = [250, 250, 250];

// ============================================================
// Options
// ============================================================

/// Where the background reference color comes from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BackgroundSource {
    /// Sample the bottom-right corner of the scan
    #[default]
    Sampled,
    /// Use a fixed reference color
    Fixed { color: [u8; 3] },
}

/// Edge detection options
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOptions {
    /// Fraction of background pixels needed for a background line (0.0-1.0]
    pub whiteness_fraction: f32,
    /// RGB distance under which a pixel matches the background
    pub color_closeness: f32,
    /// Number of parallel probe lines
    pub probe_count: u32,
    /// Consecutive background pixels confirming a transition
    pub min_background_run: u32,
    /// Minimum probes agreeing on the mode
    pub min_consensus_support: u32,
    /// Bucket width for mode aggregation
    pub mode_tolerance: u32,
    /// Samples skipped at both ends of a classified line
    pub line_margin: u32,
    /// First position scanned by a probe
    pub probe_start: u32,
    /// Background reference source
    pub background: BackgroundSource,
    /// Side length of the sampled corner patch
    pub background_patch: u32,
    /// Noise limit for the sampled corner patch
    pub max_background_noise: f32,
    /// Strategy order used by the resolver
    pub strategies: Vec<EdgeStrategy>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            whiteness_fraction: DEFAULT_WHITENESS_FRACTION,
            color_closeness: DEFAULT_COLOR_CLOSENESS,
            probe_count: DEFAULT_PROBE_COUNT,
            min_background_run: DEFAULT_MIN_BACKGROUND_RUN,
            min_consensus_support: DEFAULT_MIN_CONSENSUS_SUPPORT,
            mode_tolerance: DEFAULT_MODE_TOLERANCE,
            line_margin: 0,
            probe_start: 0,
            background: BackgroundSource::Sampled,
            background_patch: DEFAULT_BACKGROUND_PATCH,
            max_background_noise: DEFAULT_MAX_BACKGROUND_NOISE,
            strategies: EdgeStrategy::default_order().to_vec(),
        }
    }
}

impl DetectionOptions {
    /// Create a new options builder
    pub fn builder() -> DetectionOptionsBuilder {
        DetectionOptionsBuilder::default()
    }

    /// Create options for scans with a very clean background
    pub fn strict() -> Self {
        Self {
            whiteness_fraction: STRICT_WHITENESS_FRACTION,
            ..Default::default()
        }
    }

    /// Create options for dusty scanners with uneven background
    pub fn tolerant() -> Self {
        Self {
            whiteness_fraction: TOLERANT_WHITENESS_FRACTION,
            color_closeness: TOLERANT_COLOR_CLOSENESS,
            ..Default::default()
        }
    }

    /// Check that every option is in range
    pub fn validate(&self) -> Result<()> {
        if !(self.whiteness_fraction > 0.0 && self.whiteness_fraction <= 1.0) {
            return Err(EdgeError::InvalidOptions(format!(
                "whiteness_fraction must be in (0, 1], got {}",
                self.whiteness_fraction
            )));
        }
        if !(self.color_closeness >= 0.0 && self.color_closeness.is_finite()) {
            return Err(EdgeError::InvalidOptions(format!(
                "color_closeness must be a non-negative number, got {}",
                self.color_closeness
            )));
        }
        if self.probe_count == 0 {
            return Err(EdgeError::InvalidOptions(
                "probe_count must be positive".to_string(),
            ));
        }
        if self.min_background_run == 0 {
            return Err(EdgeError::InvalidOptions(
                "min_background_run must be positive".to_string(),
            ));
        }
        if self.min_consensus_support == 0 {
            return Err(EdgeError::InvalidOptions(
                "min_consensus_support must be positive".to_string(),
            ));
        }
        if self.background_patch == 0 {
            return Err(EdgeError::InvalidOptions(
                "background_patch must be positive".to_string(),
            ));
        }
        if !(self.max_background_noise >= 0.0 && self.max_background_noise.is_finite()) {
            return Err(EdgeError::InvalidOptions(format!(
                "max_background_noise must be a non-negative number, got {}",
                self.max_background_noise
            )));
        }
        if self.strategies.is_empty() {
            return Err(EdgeError::InvalidOptions(
                "at least one strategy is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for DetectionOptions
#[derive(Debug, Default)]
pub struct DetectionOptionsBuilder {
    options: DetectionOptions,
}

impl DetectionOptionsBuilder {
    /// Set line-majority threshold (clamped to 0.0-1.0)
    #[must_use]
    pub fn whiteness_fraction(mut self, fraction: f32) -> Self {
        self.options.whiteness_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set background color closeness
    #[must_use]
    pub fn color_closeness(mut self, closeness: f32) -> Self {
        self.options.color_closeness = closeness.max(0.0);
        self
    }

    /// Set number of probe lines
    #[must_use]
    pub fn probe_count(mut self, count: u32) -> Self {
        self.options.probe_count = count;
        self
    }

    /// Set minimum background run for a probe transition
    #[must_use]
    pub fn min_background_run(mut self, run: u32) -> Self {
        self.options.min_background_run = run;
        self
    }

    /// Set minimum consensus support for the mode
    #[must_use]
    pub fn min_consensus_support(mut self, support: u32) -> Self {
        self.options.min_consensus_support = support;
        self
    }

    /// Set mode bucket width
    #[must_use]
    pub fn mode_tolerance(mut self, tolerance: u32) -> Self {
        self.options.mode_tolerance = tolerance;
        self
    }

    /// Set samples skipped at both line ends
    #[must_use]
    pub fn line_margin(mut self, margin: u32) -> Self {
        self.options.line_margin = margin;
        self
    }

    /// Set probe starting position
    #[must_use]
    pub fn probe_start(mut self, start: u32) -> Self {
        self.options.probe_start = start;
        self
    }

    /// Set background source
    #[must_use]
    pub fn background(mut self, source: BackgroundSource) -> Self {
        self.options.background = source;
        self
    }

    /// Set sampled patch size
    #[must_use]
    pub fn background_patch(mut self, patch: u32) -> Self {
        self.options.background_patch = patch;
        self
    }

    /// Set noise limit for the sampled patch
    #[must_use]
    pub fn max_background_noise(mut self, noise: f32) -> Self {
        self.options.max_background_noise = noise;
        self
    }

    /// Set resolver strategy order
    #[must_use]
    pub fn strategies(mut self, strategies: Vec<EdgeStrategy>) -> Self {
        self.options.strategies = strategies;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> DetectionOptions {
        self.options
    }
}
