//! scancrop - crops scanner margin from scanned photographs
//!
//! A flatbed scan of a print is usually larger than the print itself. The
//! photograph sits at the top-left of the scan and the rest, to its right and
//! below it, is near-white scanner background. This crate finds the crop
//! rectangle that keeps only the photograph.
//!
//! # Features
//!
//! - **Edge Detection** ([`edge`]) - majority line sweep, transition probes and
//!   mode aggregation of many probes
//! - **Crop Conformance** ([`conform`]) - snap crops to canonical print sizes
//! - **File Cropping** ([`crop`]) - load, detect, crop and save scans, in parallel
//! - **Configuration** ([`config`]) - TOML config files merged with CLI flags
//!
//! # Quick Start
//!
//! ```rust
//! use image::{Rgb, RgbImage};
//! use scancrop::{detect_crop_rectangle, CropRectangle, DetectionOptions};
//!
//! let scan = RgbImage::from_fn(120, 90, |x, y| {
//!     if x < 100 && y < 70 { Rgb([40, 80, 120]) } else { Rgb([252, 252, 252]) }
//! });
//!
//! let options = DetectionOptions::builder()
//!     .whiteness_fraction(0.95)
//!     .probe_count(9)
//!     .build();
//!
//! let detection = detect_crop_rectangle(&scan, &options).unwrap();
//! assert_eq!(detection.rectangle, CropRectangle::new(100, 70));
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod cli;
pub mod config;
pub mod conform;
pub mod crop;
pub mod edge;

// Re-exports for convenience
pub use cli::{create_progress_bar, Cli, Commands, CropArgs, DetectArgs, ExitCode, TuningArgs};
pub use config::{CliOverrides, Config, ConfigError};
pub use conform::{conform_crop, ConformOptions};
pub use crop::{CropError, CropOptions, CropOutcome, ScanCropper};
pub use edge::{
    aggregate_transitions, classify_line, derive_background, detect_crop_rectangle,
    find_edge_by_majority, probe_transition, resolve_edge, Axis, BackgroundColor,
    BackgroundSource, CropDetection, CropRectangle, DetectionOptions, DetectionOptionsBuilder,
    EdgeError, EdgeEstimator, EdgeResolution, EdgeStrategy, Line, LineVerdict,
};

/// Process exit codes as plain integers
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
    pub const PROCESSING_ERROR: i32 = ExitCode::ProcessingError as i32;
}
