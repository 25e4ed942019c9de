//! Background reference derivation

use image::RgbImage;
use tracing::debug;

use super::types::{BackgroundColor, EdgeError, Result};
use super::{BackgroundSource, DetectionOptions};

/// Multiplier applied to the measured patch noise when widening the threshold
const NOISE_THRESHOLD_FACTOR: f32 = 2.0;

/// Scale turning a median absolute deviation into a standard deviation estimate
const MAD_TO_SIGMA: f32 = 1.4826;

/// Pixels further than this many robust deviations from the median are artifacts
const INLIER_SPREAD_FACTOR: f32 = 3.0;

/// Derive the background reference for `image`.
///
/// With [`BackgroundSource::Sampled`] the bottom-right corner patch is
/// measured around its per-channel median. Pixels far from the median (dust,
/// hairs, a dark lid strip) are dropped before the color and noise are taken
/// from the remaining inliers. The inliers must be nearly uniform: if any
/// channel's standard deviation exceeds `max_background_noise`, or fewer than
/// half the patch survives, the corner is probably part of the photograph and
/// [`EdgeError::InsufficientBackgroundSample`] is returned.
pub fn derive_background(image: &RgbImage, options: &DetectionOptions) -> Result<BackgroundColor> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EdgeError::EmptyImage);
    }

    match options.background {
        BackgroundSource::Fixed { color } => {
            Ok(BackgroundColor::new(color, options.color_closeness))
        }
        BackgroundSource::Sampled => sample_corner(image, options),
    }
}

fn sample_corner(image: &RgbImage, options: &DetectionOptions) -> Result<BackgroundColor> {
    let (width, height) = image.dimensions();
    let patch_w = options.background_patch.min(width);
    let patch_h = options.background_patch.min(height);

    let pixels: Vec<[u8; 3]> = (height - patch_h..height)
        .flat_map(|y| (width - patch_w..width).map(move |x| image.get_pixel(x, y).0))
        .collect();

    let medians = channel_medians(&pixels, |p, c| p[c] as f32);
    let spread = channel_medians(&pixels, |p, c| (p[c] as f32 - medians[c]).abs());
    let cutoff = spread.map(|mad| {
        (INLIER_SPREAD_FACTOR * MAD_TO_SIGMA * mad).max(options.max_background_noise)
    });

    let inliers: Vec<[u8; 3]> = pixels
        .iter()
        .filter(|p| (0..3).all(|c| (p[c] as f32 - medians[c]).abs() <= cutoff[c]))
        .copied()
        .collect();

    let (color, noise) = mean_and_noise(&inliers);

    debug!(
        color = ?color,
        noise,
        medians = ?medians,
        inliers = inliers.len(),
        patch = format!("{patch_w}x{patch_h}"),
        "Sampled background corner"
    );

    // A corner split between photo and margin has no majority to speak for it
    if inliers.len() * 2 < pixels.len() {
        return Err(EdgeError::InsufficientBackgroundSample {
            noise: mean_and_noise(&pixels).1,
            limit: options.max_background_noise,
        });
    }
    if noise > options.max_background_noise {
        return Err(EdgeError::InsufficientBackgroundSample {
            noise,
            limit: options.max_background_noise,
        });
    }

    Ok(BackgroundColor::new(
        color,
        options.color_closeness + NOISE_THRESHOLD_FACTOR * noise,
    ))
}

/// Per-channel median of `value(pixel, channel)`, averaging the two middle
/// values for an even count
fn channel_medians(pixels: &[[u8; 3]], value: impl Fn(&[u8; 3], usize) -> f32) -> [f32; 3] {
    let mut medians = [0f32; 3];
    if pixels.is_empty() {
        return medians;
    }

    for (c, median) in medians.iter_mut().enumerate() {
        let mut values: Vec<f32> = pixels.iter().map(|p| value(p, c)).collect();
        values.sort_by(f32::total_cmp);
        let mid = values.len() / 2;
        *median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
    }
    medians
}

/// Rounded mean color and largest per-channel standard deviation
fn mean_and_noise(pixels: &[[u8; 3]]) -> ([u8; 3], f32) {
    if pixels.is_empty() {
        return ([0; 3], 0.0);
    }
    let count = pixels.len() as f64;

    let mut color = [0u8; 3];
    let mut noise = 0f32;
    for (c, slot) in color.iter_mut().enumerate() {
        let sum: f64 = pixels.iter().map(|p| p[c] as f64).sum();
        let sum_sq: f64 = pixels.iter().map(|p| (p[c] as f64).powi(2)).sum();
        let mean = sum / count;
        let variance = (sum_sq / count - mean * mean).max(0.0);
        *slot = mean.round().clamp(0.0, 255.0) as u8;
        noise = noise.max(variance.sqrt() as f32);
    }
    (color, noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::NEAR_WHITE;
    use image::Rgb;

    #[test]
    fn test_uniform_corner() {
        let img = RgbImage::from_pixel(40, 30, Rgb([248, 249, 250]));
        let bg = derive_background(&img, &DetectionOptions::default()).unwrap();

        assert_eq!(bg.color, [248, 249, 250]);
        assert_eq!(bg.threshold, 40.0);
    }

    #[test]
    fn test_dithered_corner_widens_threshold() {
        let img = RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([246, 246, 246])
            } else {
                Rgb([254, 254, 254])
            }
        });
        let bg = derive_background(&img, &DetectionOptions::default()).unwrap();

        assert_eq!(bg.color, [250, 250, 250]);
        assert!((bg.threshold - 48.0).abs() < 0.01);
    }

    #[test]
    fn test_noisy_corner_rejected() {
        let img = RgbImage::from_fn(16, 16, |x, _| {
            if x % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let result = derive_background(&img, &DetectionOptions::default());

        assert!(matches!(
            result,
            Err(EdgeError::InsufficientBackgroundSample { .. })
        ));
    }

    #[test]
    fn test_patch_clamped_to_small_image() {
        let img = RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]));
        let bg = derive_background(&img, &DetectionOptions::default()).unwrap();
        assert_eq!(bg.color, [255, 255, 255]);
    }

    #[test]
    fn test_fixed_source() {
        let img = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let options = DetectionOptions::builder()
            .background(BackgroundSource::Fixed { color: NEAR_WHITE })
            .color_closeness(30.0)
            .build();
        let bg = derive_background(&img, &options).unwrap();

        assert_eq!(bg.color, NEAR_WHITE);
        assert_eq!(bg.threshold, 30.0);
    }

    #[test]
    fn test_empty_image() {
        let img = RgbImage::new(0, 0);
        let result = derive_background(&img, &DetectionOptions::default());
        assert_eq!(result, Err(EdgeError::EmptyImage));
    }

    #[test]
    fn test_artifact_in_corner_ignored() {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([247, 248, 246]));
        img.put_pixel(39, 39, Rgb([0, 0, 0]));
        img.put_pixel(35, 36, Rgb([20, 10, 5]));
        let bg = derive_background(&img, &DetectionOptions::default()).unwrap();

        assert_eq!(bg.color, [247, 248, 246]);
        assert_eq!(bg.threshold, 40.0);
    }

    #[test]
    fn test_dark_outer_column_ignored() {
        let img = RgbImage::from_fn(40, 40, |x, _| {
            if x == 39 {
                Rgb([10, 10, 10])
            } else {
                Rgb([250, 250, 250])
            }
        });
        let bg = derive_background(&img, &DetectionOptions::default()).unwrap();

        assert_eq!(bg.color, [250, 250, 250]);
        assert_eq!(bg.threshold, 40.0);
    }

    #[test]
    fn test_split_corner_rejected() {
        // Photo reaches into half of the patch
        let img = RgbImage::from_fn(16, 16, |x, _| {
            if x < 12 {
                Rgb([30, 90, 60])
            } else {
                Rgb([250, 250, 250])
            }
        });
        let result = derive_background(&img, &DetectionOptions::default());

        assert!(matches!(
            result,
            Err(EdgeError::InsufficientBackgroundSample { .. })
        ));
    }

    #[test]
    fn test_channel_medians_even_count() {
        let pixels = [[1, 10, 100], [3, 20, 200], [5, 30, 50], [7, 40, 0]];
        let medians = channel_medians(&pixels, |p, c| p[c] as f32);
        assert_eq!(medians, [4.0, 25.0, 75.0]);
    }
}
