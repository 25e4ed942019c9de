//! Scan cropping on image files
//!
//! Loads scans from disk, runs [`detect_crop_rectangle`], optionally snaps the
//! result to a preferred size and writes the cropped photograph into an output
//! directory under its original file name.

use image::{GenericImageView, ImageFormat};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::conform::{conform_crop, ConformOptions};
use crate::edge::{detect_crop_rectangle, CropDetection, CropRectangle, DetectionOptions, EdgeError};

/// Crop error types
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Detection failed: {0}")]
    Detection(#[from] EdgeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;

/// Options for cropping scans on disk
#[derive(Debug, Clone, Default)]
pub struct CropOptions {
    /// Edge detection options
    pub detection: DetectionOptions,
    /// Preferred-size snapping, disabled when `None`
    pub conform: Option<ConformOptions>,
    /// Detect only, do not write output images
    pub dry_run: bool,
}

/// Outcome of cropping one scan
#[derive(Debug, Clone)]
pub struct CropOutcome {
    pub input_path: PathBuf,
    /// Written file, `None` on a dry run
    pub output_path: Option<PathBuf>,
    pub original_size: (u32, u32),
    /// Final rectangle after conformance
    pub rectangle: CropRectangle,
    /// Raw detection result
    pub detection: CropDetection,
}

impl CropOutcome {
    /// Whether conformance changed the detected rectangle
    pub fn conformed(&self) -> bool {
        self.rectangle != self.detection.rectangle
    }
}

/// Crops scanned photographs stored as image files
pub struct ScanCropper;

impl ScanCropper {
    /// Detect the crop rectangle of an image file
    pub fn detect(image_path: &Path, options: &DetectionOptions) -> Result<CropDetection> {
        let img = Self::open(image_path)?;
        Ok(detect_crop_rectangle(&img.to_rgb8(), options)?)
    }

    /// Crop one scan into `crop_dir`, keeping its file name
    pub fn crop_file(image_path: &Path, crop_dir: &Path, options: &CropOptions) -> Result<CropOutcome> {
        let img = Self::open(image_path)?;
        let (width, height) = img.dimensions();
        info!(
            path = %image_path.display(),
            size = format!("{width}x{height}"),
            color = ?img.color(),
            "Loaded scan"
        );

        let detection = detect_crop_rectangle(&img.to_rgb8(), &options.detection)?;
        for signal in detection.signals() {
            warn!(path = %image_path.display(), "{}", signal);
        }

        let rectangle = match &options.conform {
            Some(conform) => conform_crop(detection.rectangle, (width, height), conform),
            None => detection.rectangle,
        };

        let output_path = if options.dry_run {
            None
        } else {
            let file_name = image_path
                .file_name()
                .ok_or_else(|| CropError::InvalidImage(image_path.display().to_string()))?;
            let output_path = crop_dir.join(file_name);
            img.crop_imm(rectangle.left, rectangle.top, rectangle.width(), rectangle.height())
                .save(&output_path)
                .map_err(|e| CropError::InvalidImage(e.to_string()))?;
            Some(output_path)
        };

        info!(
            path = %image_path.display(),
            crop = %rectangle,
            output = ?output_path,
            "Cropped scan"
        );

        Ok(CropOutcome {
            input_path: image_path.to_path_buf(),
            output_path,
            original_size: (width, height),
            rectangle,
            detection,
        })
    }

    /// List the image files directly inside `scan_dir`, sorted by name
    pub fn collect_images(scan_dir: &Path) -> Result<Vec<PathBuf>> {
        if !scan_dir.is_dir() {
            return Err(CropError::NotADirectory(scan_dir.to_path_buf()));
        }

        let mut images = Vec::new();
        for entry in std::fs::read_dir(scan_dir)? {
            let path = entry?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }

    /// Crop many scans in parallel.
    ///
    /// Every input yields an entry; one failing scan does not stop the batch.
    /// `on_done` is called once per finished scan, from worker threads.
    pub fn crop_batch<F>(
        images: &[PathBuf],
        crop_dir: &Path,
        options: &CropOptions,
        on_done: F,
    ) -> Vec<(PathBuf, Result<CropOutcome>)>
    where
        F: Fn(&Path) + Sync,
    {
        images
            .par_iter()
            .map(|path| {
                let result = Self::crop_file(path, crop_dir, options);
                on_done(path);
                (path.clone(), result)
            })
            .collect()
    }

    fn open(image_path: &Path) -> Result<image::DynamicImage> {
        if !image_path.exists() {
            return Err(CropError::ImageNotFound(image_path.to_path_buf()));
        }
        image::open(image_path).map_err(|e| CropError::InvalidImage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_scan(dir: &Path, name: &str, size: (u32, u32), photo: (u32, u32)) -> PathBuf {
        let img = RgbImage::from_fn(size.0, size.1, |x, y| {
            if x < photo.0 && y < photo.1 {
                Rgb([((x * 7) % 200) as u8, 90, ((y * 3) % 200) as u8])
            } else {
                Rgb([251, 251, 251])
            }
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_image_not_found() {
        let result = ScanCropper::detect(
            Path::new("/nonexistent/scan.png"),
            &DetectionOptions::default(),
        );
        assert!(matches!(result, Err(CropError::ImageNotFound(_))));
    }

    #[test]
    fn test_crop_file_writes_output() {
        let scans = tempfile::tempdir().unwrap();
        let crops = tempfile::tempdir().unwrap();
        let input = write_scan(scans.path(), "photo.png", (120, 90), (100, 70));

        let outcome = ScanCropper::crop_file(&input, crops.path(), &CropOptions::default()).unwrap();

        assert_eq!(outcome.rectangle, CropRectangle::new(100, 70));
        assert_eq!(outcome.original_size, (120, 90));
        let output = outcome.output_path.unwrap();
        assert_eq!(output, crops.path().join("photo.png"));
        let cropped = image::open(&output).unwrap();
        assert_eq!(cropped.dimensions(), (100, 70));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let scans = tempfile::tempdir().unwrap();
        let crops = tempfile::tempdir().unwrap();
        let input = write_scan(scans.path(), "photo.png", (60, 60), (40, 40));
        let options = CropOptions {
            dry_run: true,
            ..Default::default()
        };

        let outcome = ScanCropper::crop_file(&input, crops.path(), &options).unwrap();

        assert!(outcome.output_path.is_none());
        assert!(!crops.path().join("photo.png").exists());
    }

    #[test]
    fn test_conform_applied() {
        let scans = tempfile::tempdir().unwrap();
        let input = write_scan(scans.path(), "photo.png", (120, 90), (98, 71));
        let options = CropOptions {
            conform: Some(ConformOptions {
                preferred_sizes: vec![(100, 70)],
                max_distance: 4.0,
            }),
            dry_run: true,
            ..Default::default()
        };

        let outcome = ScanCropper::crop_file(&input, scans.path(), &options).unwrap();

        assert_eq!(outcome.detection.rectangle, CropRectangle::new(98, 71));
        assert_eq!(outcome.rectangle, CropRectangle::new(100, 70));
        assert!(outcome.conformed());
    }

    #[test]
    fn test_collect_images_filters_files() {
        let scans = tempfile::tempdir().unwrap();
        write_scan(scans.path(), "b.png", (10, 10), (5, 5));
        write_scan(scans.path(), "a.png", (10, 10), (5, 5));
        std::fs::write(scans.path().join("notes.txt"), "not an image").unwrap();
        std::fs::create_dir(scans.path().join("nested.png")).unwrap();

        let images = ScanCropper::collect_images(scans.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_collect_images_not_a_directory() {
        let result = ScanCropper::collect_images(Path::new("/nonexistent/dir"));
        assert!(matches!(result, Err(CropError::NotADirectory(_))));
    }

    #[test]
    fn test_io_error_variant() {
        let err: CropError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "scanner share").into();

        assert!(matches!(err, CropError::Io(_)));
        assert_eq!(err.to_string(), "IO error: scanner share");
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let scans = tempfile::tempdir().unwrap();
        let crops = tempfile::tempdir().unwrap();
        let good = write_scan(scans.path(), "good.png", (80, 80), (60, 50));
        let bad = scans.path().join("broken.png");
        std::fs::write(&bad, b"definitely not a png").unwrap();

        let done = std::sync::atomic::AtomicUsize::new(0);
        let results = ScanCropper::crop_batch(
            &[good.clone(), bad.clone()],
            crops.path(),
            &CropOptions::default(),
            |_| {
                done.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            },
        );

        assert_eq!(done.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(results.len(), 2);
        let good_result = results.iter().find(|(p, _)| p == &good).unwrap();
        assert_eq!(
            good_result.1.as_ref().unwrap().rectangle,
            CropRectangle::new(60, 50)
        );
        let bad_result = results.iter().find(|(p, _)| p == &bad).unwrap();
        assert!(matches!(bad_result.1, Err(CropError::InvalidImage(_))));
    }
}
