//! Multi-probe aggregation
//!
//! Runs the transition probe over evenly spaced parallel lines and takes the
//! mode of the results. Scanner artifacts near the margin push individual
//! probes far past the real edge; the maximum would follow that single line,
//! while the mode follows the majority of lines.

use image::RgbImage;
use tracing::{debug, info};

use super::probe::probe_transition;
use super::types::{Axis, BackgroundColor, EdgeError, Result};
use super::DetectionOptions;

/// Indices of the lines probed when searching the edge on `axis`.
///
/// `probe_count` lines are spread evenly across the orthogonal extent at
/// `(i + 1) * length / (probe_count + 1)`. The count is capped at the number
/// of available lines. Once the extent is no longer than `probe_count + 1`
/// lines the outermost lines, including line 0, can be probed. Duplicates
/// from small images are removed.
pub fn probe_lines(image: &RgbImage, axis: Axis, options: &DetectionOptions) -> Vec<u32> {
    let length = axis.line_length(image) as u64;
    let count = (options.probe_count as u64).min(length);
    if length == 0 || count == 0 {
        return Vec::new();
    }

    let mut lines: Vec<u32> = (0..count)
        .map(|i| ((i + 1) * length / (count + 1)) as u32)
        .collect();
    lines.dedup();
    lines
}

/// Bucketed mode of `values`.
///
/// Sorted values are grouped into buckets whose members lie within
/// `tolerance` of the bucket's first value. The largest bucket wins, ties go
/// to the smaller position, and the bucket's lower median is returned together
/// with its size. Returns `None` for an empty input.
pub fn mode_of(values: &[u32], tolerance: u32) -> Option<(u32, usize)> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mut best: Option<&[u32]> = None;
    let mut start = 0;
    while start < sorted.len() {
        let first = sorted[start];
        let end = sorted[start..]
            .iter()
            .position(|&v| v - first > tolerance)
            .map_or(sorted.len(), |offset| start + offset);
        let bucket = &sorted[start..end];

        if best.map_or(true, |b| bucket.len() > b.len()) {
            best = Some(bucket);
        }
        start = end;
    }

    best.map(|bucket| (bucket[(bucket.len() - 1) / 2], bucket.len()))
}

/// Find the photograph edge on `axis` from the consensus of many probes.
///
/// Fails with [`EdgeError::NoConsensus`] when fewer than
/// `min_consensus_support` probes agree on the winning position.
pub fn aggregate_transitions(
    image: &RgbImage,
    axis: Axis,
    background: &BackgroundColor,
    options: &DetectionOptions,
) -> Result<u32> {
    let transitions: Vec<u32> = probe_lines(image, axis, options)
        .into_iter()
        .filter_map(|line| probe_transition(image, line, axis, background, options))
        .collect();

    let required = options.min_consensus_support as usize;
    let (position, support) = mode_of(&transitions, options.mode_tolerance).unwrap_or((0, 0));

    debug!(
        %axis,
        transitions = ?transitions,
        mode = position,
        support,
        "Aggregated probe transitions"
    );

    if support < required {
        return Err(EdgeError::NoConsensus { support, required });
    }

    if let Some(&max) = transitions.iter().max() {
        if max != position {
            info!(%axis, mode = position, max, "Mode differs from maximum transition");
        }
    }

    Ok(position)
}
