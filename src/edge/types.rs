//! Common types for the edge detection module

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Edge detection error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EdgeError {
    #[error("Background sample is not uniform (noise {noise:.1} exceeds {limit:.1})")]
    InsufficientBackgroundSample { noise: f32, limit: f32 },

    #[error("Probe transitions too scattered: best support {support}, need {required}")]
    NoConsensus { support: usize, required: usize },

    #[error("No margin edge detected on {0} axis")]
    EdgeNotDetected(Axis),

    #[error("Invalid detection options: {0}")]
    InvalidOptions(String),

    #[error("Image has no pixels")]
    EmptyImage,
}

pub type Result<T> = std::result::Result<T, EdgeError>;

// ============================================================
// Axis
// ============================================================

/// Axis along which an edge is searched.
///
/// `X` finds the right edge by sweeping columns; `Y` finds the bottom edge by
/// sweeping rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Number of lines that can be swept on this axis
    pub fn extent(self, image: &RgbImage) -> u32 {
        match self {
            Axis::X => image.width(),
            Axis::Y => image.height(),
        }
    }

    /// Length of each swept line (the orthogonal extent)
    pub fn line_length(self, image: &RgbImage) -> u32 {
        match self {
            Axis::X => image.height(),
            Axis::Y => image.width(),
        }
    }

    /// The other axis
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

// ============================================================
// Background
// ============================================================

/// Reference color of the scanner background plus the distance under which
/// a pixel counts as background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundColor {
    /// Reference RGB color
    pub color: [u8; 3],
    /// Maximum Euclidean RGB distance for a background pixel
    pub threshold: f32,
}

impl BackgroundColor {
    pub fn new(color: [u8; 3], threshold: f32) -> Self {
        Self { color, threshold }
    }

    /// Euclidean RGB distance between `pixel` and the reference color
    pub fn distance(&self, pixel: &Rgb<u8>) -> f32 {
        rgb_distance(self.color, pixel.0)
    }

    /// Whether `pixel` is close enough to count as background
    #[inline]
    pub fn matches(&self, pixel: &Rgb<u8>) -> bool {
        self.distance(pixel) <= self.threshold
    }
}

/// Euclidean distance between two RGB colors
pub fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    let sum: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(&p, &q)| {
            let d = p as f32 - q as f32;
            d * d
        })
        .sum();
    sum.sqrt()
}

// ============================================================
// Verdicts and results
// ============================================================

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVerdict {
    /// Whether the line is mostly background
    pub is_background: bool,
    /// Fraction of counted pixels classified as background (0.0-1.0)
    pub background_fraction: f32,
}

/// Retained photograph region.
///
/// Left and top are always 0: scanner margin only appears to the right and
/// bottom of the photograph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRectangle {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRectangle {
    /// Rectangle anchored at the origin
    pub fn new(right: u32, bottom: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

impl fmt::Display for CropRectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}
