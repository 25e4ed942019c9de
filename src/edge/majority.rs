//! Majority-based edge detection
//!
//! Sweeps lines from the outer edge of the scan toward the origin. Lines of
//! scanner margin are mostly background; the first line that is not marks the
//! photograph's edge. A stray speck in the margin only lowers a line's
//! background fraction slightly, so it does not stop the sweep.

use image::RgbImage;
use tracing::debug;

use super::line::{classify_line, Line};
use super::types::{Axis, BackgroundColor};
use super::DetectionOptions;

/// Find the photograph edge on `axis` by majority line classification.
///
/// Returns the exclusive crop bound: the index of the first non-background
/// line (scanning inward) plus one. A photograph ending at column `k` yields
/// exactly `k`. When the outermost line already contains content the image
/// extent is returned unchanged. Returns `None` if every line is background.
pub fn find_edge_by_majority(
    image: &RgbImage,
    axis: Axis,
    background: &BackgroundColor,
    options: &DetectionOptions,
) -> Option<u32> {
    let extent = axis.extent(image);

    for index in (0..extent).rev() {
        let line = Line::new(image, axis, index);
        let verdict = classify_line(&line, background, options);
        debug!(
            %axis,
            line = index,
            fraction = verdict.background_fraction,
            background = verdict.is_background,
            "Classified line"
        );

        if !verdict.is_background {
            return Some(index + 1);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([250, 250, 250]);
    const PHOTO: Rgb<u8> = Rgb([120, 90, 60]);

    fn background() -> BackgroundColor {
        BackgroundColor::new([250, 250, 250], 40.0)
    }

    #[test]
    fn test_hard_boundary_column() {
        let img = RgbImage::from_fn(64, 48, |x, _| if x < 37 { PHOTO } else { WHITE });

        let edge = find_edge_by_majority(&img, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(edge, Some(37));
    }

    #[test]
    fn test_hard_boundary_row() {
        let img = RgbImage::from_fn(48, 64, |_, y| if y < 21 { PHOTO } else { WHITE });

        let edge = find_edge_by_majority(&img, Axis::Y, &background(), &DetectionOptions::default());
        assert_eq!(edge, Some(21));
    }

    #[test]
    fn test_no_margin_returns_extent() {
        let img = RgbImage::from_pixel(30, 20, PHOTO);

        let edge = find_edge_by_majority(&img, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(edge, Some(30));
    }

    #[test]
    fn test_all_background_returns_none() {
        let img = RgbImage::from_pixel(30, 20, WHITE);

        let edge = find_edge_by_majority(&img, Axis::Y, &background(), &DetectionOptions::default());
        assert_eq!(edge, None);
    }

    #[test]
    fn test_speck_in_margin_ignored() {
        let img = RgbImage::from_fn(100, 100, |x, y| {
            if x < 80 {
                PHOTO
            } else if x == 95 && y == 40 {
                Rgb([0, 0, 0])
            } else {
                WHITE
            }
        });

        let edge = find_edge_by_majority(&img, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(edge, Some(80));
    }

    #[test]
    fn test_white_photo_border_not_mistaken_for_margin() {
        // Photo with a white band at its right edge; its rows still contain
        // content elsewhere so the columns are not mostly background.
        let img = RgbImage::from_fn(100, 100, |x, y| {
            if x < 80 && (x < 70 || y < 50) {
                PHOTO
            } else {
                WHITE
            }
        });

        let edge = find_edge_by_majority(&img, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(edge, Some(80));
    }
}
