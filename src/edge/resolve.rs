//! Edge resolution and crop assembly

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregate::aggregate_transitions;
use super::background::derive_background;
use super::majority::find_edge_by_majority;
use super::probe::probe_transition;
use super::types::{Axis, BackgroundColor, CropRectangle, EdgeError, Result};
use super::DetectionOptions;

// ============================================================
// Estimators
// ============================================================

/// Common interface of the edge detection strategies.
///
/// `Ok(Some(position))` is a proposed exclusive crop bound on `axis`,
/// `Ok(None)` means the strategy found nothing, and `Err` reports why it could
/// not decide.
pub trait EdgeEstimator {
    /// Strategy name used in logs
    fn name(&self) -> &'static str;

    /// Estimate the photograph edge on `axis`
    fn estimate(
        &self,
        image: &RgbImage,
        axis: Axis,
        background: &BackgroundColor,
        options: &DetectionOptions,
    ) -> Result<Option<u32>>;
}

/// Built-in edge detection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeStrategy {
    /// Sweep lines inward until one is not mostly background
    Majority,
    /// Probe the middle line only
    SingleProbe,
    /// Mode of evenly spaced probes
    MultiProbe,
}

impl EdgeStrategy {
    /// Order used when none is configured
    pub fn default_order() -> [EdgeStrategy; 2] {
        [EdgeStrategy::Majority, EdgeStrategy::MultiProbe]
    }
}

impl EdgeEstimator for EdgeStrategy {
    fn name(&self) -> &'static str {
        match self {
            EdgeStrategy::Majority => "majority",
            EdgeStrategy::SingleProbe => "single-probe",
            EdgeStrategy::MultiProbe => "multi-probe",
        }
    }

    fn estimate(
        &self,
        image: &RgbImage,
        axis: Axis,
        background: &BackgroundColor,
        options: &DetectionOptions,
    ) -> Result<Option<u32>> {
        match self {
            EdgeStrategy::Majority => Ok(find_edge_by_majority(image, axis, background, options)),
            EdgeStrategy::SingleProbe => {
                let length = axis.line_length(image);
                if length == 0 {
                    return Ok(None);
                }
                Ok(probe_transition(image, length / 2, axis, background, options))
            }
            EdgeStrategy::MultiProbe => {
                aggregate_transitions(image, axis, background, options).map(Some)
            }
        }
    }
}

// ============================================================
// Resolution
// ============================================================

/// Resolved edge for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeResolution {
    /// Axis searched
    pub axis: Axis,
    /// Exclusive crop bound on the axis
    pub position: u32,
    /// Strategy that found the edge, `None` if no margin was detected
    pub strategy: Option<EdgeStrategy>,
}

impl EdgeResolution {
    /// Whether a margin was found on this axis
    pub fn is_detected(&self) -> bool {
        self.strategy.is_some()
    }
}

/// Result of a full crop detection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropDetection {
    /// Retained photograph region
    pub rectangle: CropRectangle,
    /// Background reference the detection ran against
    pub background: BackgroundColor,
    /// Right edge resolution
    pub right: EdgeResolution,
    /// Bottom edge resolution
    pub bottom: EdgeResolution,
}

impl CropDetection {
    /// Soft failures: one [`EdgeError::EdgeNotDetected`] per axis left uncropped
    pub fn signals(&self) -> Vec<EdgeError> {
        [self.right, self.bottom]
            .iter()
            .filter(|r| !r.is_detected())
            .map(|r| EdgeError::EdgeNotDetected(r.axis))
            .collect()
    }

    /// Whether both edges were detected
    pub fn is_complete(&self) -> bool {
        self.right.is_detected() && self.bottom.is_detected()
    }
}

/// Resolve the edge on `axis` by trying each configured strategy in order.
///
/// A strategy is accepted when it proposes a position strictly inside the
/// image. Strategy failures are logged and the next one is tried. When none
/// succeeds the full extent is kept, so a missed edge never cuts into the
/// photograph.
pub fn resolve_edge(
    image: &RgbImage,
    axis: Axis,
    background: &BackgroundColor,
    options: &DetectionOptions,
) -> EdgeResolution {
    let extent = axis.extent(image);

    for strategy in &options.strategies {
        match strategy.estimate(image, axis, background, options) {
            Ok(Some(position)) if position > 0 && position < extent => {
                info!(%axis, position, strategy = strategy.name(), "Edge resolved");
                return EdgeResolution {
                    axis,
                    position,
                    strategy: Some(*strategy),
                };
            }
            Ok(proposal) => {
                debug!(%axis, ?proposal, strategy = strategy.name(), "No margin found");
            }
            Err(e) => {
                debug!(%axis, strategy = strategy.name(), error = %e, "Strategy failed");
            }
        }
    }

    warn!(%axis, extent, "{}", EdgeError::EdgeNotDetected(axis));
    EdgeResolution {
        axis,
        position: extent,
        strategy: None,
    }
}

/// Detect the crop rectangle separating a scanned photograph from the
/// scanner margin on its right and bottom.
///
/// Hard failures (invalid options, an empty image, or a background corner
/// that is not uniform) are returned as errors. An axis without a detectable
/// margin is left uncropped and reported through [`CropDetection::signals`].
pub fn detect_crop_rectangle(image: &RgbImage, options: &DetectionOptions) -> Result<CropDetection> {
    options.validate()?;
    let background = derive_background(image, options)?;

    let right = resolve_edge(image, Axis::X, &background, options);
    let bottom = resolve_edge(image, Axis::Y, &background, options);

    Ok(CropDetection {
        rectangle: CropRectangle::new(right.position, bottom.position),
        background,
        right,
        bottom,
    })
}
