//! Line sampling and classification

use image::{Rgb, RgbImage};

use super::types::{Axis, BackgroundColor, LineVerdict};
use super::DetectionOptions;

/// Borrowed view of one row or column of an image.
///
/// For [`Axis::X`] a line is the column at `index`, sampled along y. For
/// [`Axis::Y`] it is the row at `index`, sampled along x. Position 0 is the
/// sample closest to the image origin.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    image: &'a RgbImage,
    axis: Axis,
    index: u32,
}

impl<'a> Line<'a> {
    /// Line swept when searching the edge on `axis`
    pub fn new(image: &'a RgbImage, axis: Axis, index: u32) -> Self {
        debug_assert!(index < axis.extent(image));
        Self { image, axis, index }
    }

    /// Line followed by a probe searching the edge on `axis`.
    ///
    /// A probe for the right edge runs along a row, so this is the swept line
    /// of the orthogonal axis.
    pub fn probe(image: &'a RgbImage, axis: Axis, index: u32) -> Self {
        Self::new(image, axis.orthogonal(), index)
    }

    pub fn len(&self) -> u32 {
        self.axis.line_length(self.image)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel at `position` along the line
    #[inline]
    pub fn pixel(&self, position: u32) -> &'a Rgb<u8> {
        match self.axis {
            Axis::X => self.image.get_pixel(self.index, position),
            Axis::Y => self.image.get_pixel(position, self.index),
        }
    }

    /// Pixels in `start..end`, clamped to the line length
    pub fn pixels(&self, start: u32, end: u32) -> impl Iterator<Item = &'a Rgb<u8>> + 'a {
        let line = *self;
        let end = end.min(self.len());
        (start.min(end)..end).map(move |p| line.pixel(p))
    }
}

/// Classify a line as mostly background or containing content.
///
/// `line_margin` samples are skipped at both ends. The line is background when
/// at least `whiteness_fraction` of the remaining samples match `background`.
pub fn classify_line(
    line: &Line<'_>,
    background: &BackgroundColor,
    options: &DetectionOptions,
) -> LineVerdict {
    let start = options.line_margin;
    let end = line.len().saturating_sub(options.line_margin);

    let mut counted = 0u32;
    let mut matched = 0u32;
    for pixel in line.pixels(start, end) {
        counted += 1;
        if background.matches(pixel) {
            matched += 1;
        }
    }

    if counted == 0 {
        return LineVerdict {
            is_background: false,
            background_fraction: 0.0,
        };
    }

    let background_fraction = matched as f32 / counted as f32;
    LineVerdict {
        is_background: matched as f64 >= options.whiteness_fraction as f64 * counted as f64,
        background_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([252, 252, 252]);
    const DARK: Rgb<u8> = Rgb([40, 30, 20]);

    fn background() -> BackgroundColor {
        BackgroundColor::new([250, 250, 250], 40.0)
    }

    #[test]
    fn test_line_orientation() {
        let img = RgbImage::from_fn(4, 3, |x, y| Rgb([x as u8, y as u8, 0]));

        let column = Line::new(&img, Axis::X, 2);
        assert_eq!(column.len(), 3);
        assert_eq!(column.pixel(1).0, [2, 1, 0]);

        let row = Line::new(&img, Axis::Y, 1);
        assert_eq!(row.len(), 4);
        assert_eq!(row.pixel(3).0, [3, 1, 0]);

        let probe = Line::probe(&img, Axis::X, 2);
        assert_eq!(probe.len(), 4);
        assert_eq!(probe.pixel(0).0, [0, 2, 0]);
    }

    #[test]
    fn test_all_background_line() {
        let img = RgbImage::from_pixel(10, 50, WHITE);
        let line = Line::new(&img, Axis::X, 5);
        let options = DetectionOptions::builder().whiteness_fraction(1.0).build();

        let verdict = classify_line(&line, &background(), &options);
        assert!(verdict.is_background);
        assert_eq!(verdict.background_fraction, 1.0);
    }

    #[test]
    fn test_minority_content_tolerated() {
        // 2 of 100 pixels dark
        let img = RgbImage::from_fn(1, 100, |_, y| if y == 10 || y == 70 { DARK } else { WHITE });
        let line = Line::new(&img, Axis::X, 0);

        let verdict = classify_line(&line, &background(), &DetectionOptions::default());
        assert!(verdict.is_background);
        assert!((verdict.background_fraction - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_content_line_rejected() {
        // 6% content exceeds 1 - 0.95
        let img = RgbImage::from_fn(100, 1, |x, _| if x < 6 { DARK } else { WHITE });
        let line = Line::new(&img, Axis::Y, 0);

        let verdict = classify_line(&line, &background(), &DetectionOptions::default());
        assert!(!verdict.is_background);
        assert!((verdict.background_fraction - 0.94).abs() < 1e-6);
    }

    #[test]
    fn test_line_margin_skips_ends() {
        let img = RgbImage::from_fn(1, 40, |_, y| if y < 10 || y >= 30 { DARK } else { WHITE });
        let line = Line::new(&img, Axis::X, 0);

        let plain = classify_line(&line, &background(), &DetectionOptions::default());
        assert!(!plain.is_background);

        let options = DetectionOptions::builder().line_margin(10).build();
        let trimmed = classify_line(&line, &background(), &options);
        assert!(trimmed.is_background);
        assert_eq!(trimmed.background_fraction, 1.0);
    }

    #[test]
    fn test_margin_larger_than_line() {
        let img = RgbImage::from_pixel(1, 10, WHITE);
        let line = Line::new(&img, Axis::X, 0);
        let options = DetectionOptions::builder().line_margin(20).build();

        let verdict = classify_line(&line, &background(), &options);
        assert!(!verdict.is_background);
        assert_eq!(verdict.background_fraction, 0.0);
    }
}
