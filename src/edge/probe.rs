//! Single-line transition probe

use image::RgbImage;
use tracing::trace;

use super::line::Line;
use super::types::{Axis, BackgroundColor};
use super::DetectionOptions;

/// Follow one line from the photograph toward the margin and find where the
/// background begins.
///
/// For [`Axis::X`] the probed line is row `line_index`; for [`Axis::Y`] it is
/// column `line_index`. Scanning starts at `probe_start`. The result is the
/// start of the first run of at least `min_background_run` background pixels
/// that follows some content. Background before any content is skipped, and a
/// run cut short by the end of the line does not count.
///
/// A photograph whose own edge is background-colored along this line makes
/// the probe fire early. [`aggregate_transitions`](super::aggregate_transitions)
/// compensates by polling many lines.
pub fn probe_transition(
    image: &RgbImage,
    line_index: u32,
    axis: Axis,
    background: &BackgroundColor,
    options: &DetectionOptions,
) -> Option<u32> {
    let line = Line::probe(image, axis, line_index);
    let min_run = options.min_background_run;

    let mut seen_content = false;
    let mut run_start: Option<u32> = None;
    let mut run_len = 0u32;

    for position in options.probe_start..line.len() {
        if background.matches(line.pixel(position)) {
            let start = *run_start.get_or_insert(position);
            run_len += 1;
            if seen_content && run_len >= min_run {
                trace!(%axis, line = line_index, transition = start, "Probe transition");
                return Some(start);
            }
        } else {
            seen_content = true;
            run_start = None;
            run_len = 0;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([250, 250, 250]);
    const PHOTO: Rgb<u8> = Rgb([30, 80, 140]);

    fn background() -> BackgroundColor {
        BackgroundColor::new([250, 250, 250], 40.0)
    }

    fn row(pattern: impl Fn(u32) -> Rgb<u8>, len: u32) -> RgbImage {
        RgbImage::from_fn(len, 1, |x, _| pattern(x))
    }

    #[test]
    fn test_transition_found() {
        let img = row(|x| if x < 33 { PHOTO } else { WHITE }, 60);
        let result = probe_transition(&img, 0, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(result, Some(33));
    }

    #[test]
    fn test_transition_along_column() {
        let img = RgbImage::from_fn(3, 50, |_, y| if y < 20 { PHOTO } else { WHITE });
        let result = probe_transition(&img, 1, Axis::Y, &background(), &DetectionOptions::default());
        assert_eq!(result, Some(20));
    }

    #[test]
    fn test_all_content_returns_none() {
        let img = row(|_| PHOTO, 60);
        let result = probe_transition(&img, 0, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_all_background_returns_none() {
        let img = row(|_| WHITE, 60);
        let result = probe_transition(&img, 0, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_short_white_run_skipped() {
        // Highlight of 4 px inside the photo, margin from 40
        let img = row(
            |x| if (10..14).contains(&x) || x >= 40 { WHITE } else { PHOTO },
            60,
        );
        let result = probe_transition(&img, 0, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(result, Some(40));
    }

    #[test]
    fn test_leading_background_skipped() {
        let img = row(|x| if x < 12 || x >= 30 { WHITE } else { PHOTO }, 60);
        let result = probe_transition(&img, 0, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(result, Some(30));
    }

    #[test]
    fn test_run_truncated_by_line_end() {
        let img = row(|x| if x < 55 { PHOTO } else { WHITE }, 60);
        let result = probe_transition(&img, 0, Axis::X, &background(), &DetectionOptions::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_probe_start_offset() {
        let img = row(|x| if (5..20).contains(&x) || x >= 45 { WHITE } else { PHOTO }, 60);
        let options = DetectionOptions::builder().probe_start(25).build();
        let result = probe_transition(&img, 0, Axis::X, &background(), &options);
        assert_eq!(result, Some(45));
    }
}
