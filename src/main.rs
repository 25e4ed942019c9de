//! scancrop - crops scanner margin from scanned photographs
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use scancrop::{
    create_progress_bar, exit_codes, Cli, Commands, Config, CropArgs, DetectArgs, ScanCropper,
    TuningArgs,
};

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.parse::<tracing::Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Error: Invalid log level {}", cli.log_level);
            std::process::exit(exit_codes::INVALID_ARGS);
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Crop(args) => run_crop(&args),
        Commands::Detect(args) => run_detect(&args),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

fn load_config(tuning: &TuningArgs) -> anyhow::Result<Config> {
    match &tuning.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config file {}", path.display())),
        None => Config::load().context("Failed to load config file"),
    }
}

// ============ Crop Command ============

fn run_crop(args: &CropArgs) -> anyhow::Result<i32> {
    if !args.input.exists() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    if !args.dry_run && !args.output.is_dir() {
        if args.create_output {
            std::fs::create_dir_all(&args.output).with_context(|| {
                format!("Failed to create output directory {}", args.output.display())
            })?;
        } else {
            eprintln!(
                "Error: Crop directory {} does not exist or is not a directory",
                args.output.display()
            );
            return Ok(exit_codes::OUTPUT_ERROR);
        }
    }

    let config = load_config(&args.tuning)?;
    let options = config.merge_with_cli(&args.overrides());
    if let Err(e) = options.detection.validate() {
        eprintln!("Error: {}", e);
        return Ok(exit_codes::INVALID_ARGS);
    }

    if args.input.is_file() {
        return match ScanCropper::crop_file(&args.input, &args.output, &options) {
            Ok(outcome) => {
                println!("{}: {}", outcome.input_path.display(), outcome.rectangle);
                Ok(exit_codes::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}: {}", args.input.display(), e);
                Ok(exit_codes::PROCESSING_ERROR)
            }
        };
    }

    let images = ScanCropper::collect_images(&args.input)?;
    if images.is_empty() {
        eprintln!("Error: No images found in {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let pb = create_progress_bar(images.len() as u64);
    let results = ScanCropper::crop_batch(&images, &args.output, &options, |_| pb.inc(1));
    pb.finish_and_clear();

    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(outcome) => println!("{}: {}", path.display(), outcome.rectangle),
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {}", path.display(), e);
            }
        }
    }

    println!(
        "Cropped {} of {} scans{}",
        results.len() - failed,
        results.len(),
        if args.dry_run { " (dry run)" } else { "" }
    );

    Ok(if failed > 0 {
        exit_codes::PROCESSING_ERROR
    } else {
        exit_codes::SUCCESS
    })
}

// ============ Detect Command ============

fn run_detect(args: &DetectArgs) -> anyhow::Result<i32> {
    if !args.input.is_file() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let config = load_config(&args.tuning)?;
    let options = config.merge_with_cli(&args.overrides());
    if let Err(e) = options.detection.validate() {
        eprintln!("Error: {}", e);
        return Ok(exit_codes::INVALID_ARGS);
    }

    let detection = match ScanCropper::detect(&args.input, &options.detection) {
        Ok(detection) => detection,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(exit_codes::PROCESSING_ERROR);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        println!("{}", detection.rectangle);
        for signal in detection.signals() {
            eprintln!("Warning: {}", signal);
        }
    }

    Ok(exit_codes::SUCCESS)
}
