//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 2,
    InputNotFound = 3,
    /// Output directory missing or not writable
    OutputError = 4,
    /// Detection or decoding failed for at least one scan
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file or directory not found",
            ExitCode::OutputError => "Output error (missing directory, permission denied, etc.)",
            ExitCode::ProcessingError => "Processing error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

/// Crops scanner margin from scanned photographs
#[derive(Parser, Debug)]
#[command(name = "scancrop")]
#[command(version)]
#[command(about = "Crops scanner margin from scanned photographs", long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crop a scanned image or every image in a directory
    Crop(CropArgs),
    /// Print the detected crop rectangle of one scan
    Detect(DetectArgs),
}

/// Detection tuning shared by the commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Config file path (defaults to ./scancrop.toml, then the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fraction of background pixels for a line to count as margin (0.0-1.0]
    #[arg(long)]
    pub whiteness: Option<f32>,

    /// RGB distance under which a pixel matches the background
    #[arg(long)]
    pub closeness: Option<f32>,

    /// Number of parallel probe lines
    #[arg(long)]
    pub probes: Option<u32>,
}

/// Arguments for the crop command
#[derive(clap::Args, Debug)]
pub struct CropArgs {
    /// Scanned image file or directory of scans
    pub input: PathBuf,

    /// Directory to write cropped images to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Create the output directory if it does not exist
    #[arg(long)]
    pub create_output: bool,

    /// Do not snap crops to preferred photo sizes
    #[arg(long)]
    pub no_conform: bool,

    /// Detect and report without writing images
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

impl CropArgs {
    /// CLI values overriding the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            whiteness_fraction: self.tuning.whiteness,
            color_closeness: self.tuning.closeness,
            probe_count: self.tuning.probes,
            no_conform: self.no_conform,
            dry_run: self.dry_run,
        }
    }
}

/// Arguments for the detect command
#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    /// Scanned image file
    pub input: PathBuf,

    /// Print the full detection as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

impl DetectArgs {
    /// CLI values overriding the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            whiteness_fraction: self.tuning.whiteness,
            color_closeness: self.tuning.closeness,
            probe_count: self.tuning.probes,
            no_conform: true,
            dry_run: true,
        }
    }
}

/// Create a progress bar for batch cropping
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
