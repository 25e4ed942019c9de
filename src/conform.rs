//! Crop conformance to preferred photo sizes
//!
//! Most scanned prints come in a handful of canonical sizes. A detected crop
//! that lands within a few pixels of one of them is snapped to it, which
//! removes the jitter left by soft photo edges.

use tracing::debug;

use crate::edge::CropRectangle;

/// 6"x4" landscape at 295 dpi
pub const LANDSCAPE_6X4: (u32, u32) = (1770, 1180);

/// 4"x6" portrait at 295 dpi
pub const PORTRAIT_4X6: (u32, u32) = (1180, 1770);

/// Default maximum distance (pixels) for snapping to a preferred size
const DEFAULT_CONFORM_DISTANCE: f64 = 16.0;

/// Options for crop conformance
#[derive(Debug, Clone, PartialEq)]
pub struct ConformOptions {
    /// Canonical crop sizes as (width, height)
    pub preferred_sizes: Vec<(u32, u32)>,
    /// Maximum Euclidean distance between the crop corner and a preferred size
    pub max_distance: f64,
}

impl Default for ConformOptions {
    fn default() -> Self {
        Self {
            preferred_sizes: vec![LANDSCAPE_6X4, PORTRAIT_4X6],
            max_distance: DEFAULT_CONFORM_DISTANCE,
        }
    }
}

/// Snap `rect` to the first preferred size within `max_distance` of its
/// bottom-right corner.
///
/// Sizes larger than `image_size` are never chosen, so the result stays inside
/// the image. Returns `rect` unchanged when nothing is close enough.
pub fn conform_crop(
    rect: CropRectangle,
    image_size: (u32, u32),
    options: &ConformOptions,
) -> CropRectangle {
    let corner = (rect.right, rect.bottom);

    for &size in &options.preferred_sizes {
        if size.0 > image_size.0 || size.1 > image_size.1 {
            continue;
        }
        let distance = point_distance(size, corner);
        debug!(preferred = ?size, distance, "Preferred crop distance");
        if distance < options.max_distance {
            return CropRectangle::new(size.0, size.1);
        }
    }

    rect
}

fn point_distance(a: (u32, u32), b: (u32, u32)) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    (dx * dx + dy * dy).sqrt()
}
