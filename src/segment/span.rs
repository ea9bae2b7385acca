use image::RgbImage;

use super::{SegmentConfig, classify_columns};

/// Half-open horizontal pixel range `[start, end)` occupied by one figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }
}

/// Find the figure spans of a strip by column whitespace analysis.
///
/// Returns an empty vector for an all-background strip.
pub fn find_spans(strip: &RgbImage, config: &SegmentConfig) -> Vec<Span> {
    let columns = classify_columns(strip, config);
    spans_from_columns(&columns, config.min_gap_width)
}

/// Scan a column classification left to right and collect figure spans.
///
/// A background run shorter than `min_gap_width` inside a figure is treated
/// as noise (e.g. the space between two limbs) and does not close the span.
pub fn spans_from_columns(background: &[bool], min_gap_width: u32) -> Vec<Span> {
    let width = background.len();
    let gap = min_gap_width as usize;

    // Length of the background run starting at each column
    let mut run = vec![0usize; width + 1];
    for x in (0..width).rev() {
        if background[x] {
            run[x] = run[x + 1] + 1;
        }
    }

    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for x in 0..width {
        match open {
            None if !background[x] => open = Some(x),
            Some(start) if background[x] && run[x] >= gap => {
                spans.push(span_at(start, x));
                open = None;
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        spans.push(span_at(start, width));
    }

    spans
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "column indices come from a u32 image width"
)]
fn span_at(start: usize, end: usize) -> Span {
    Span::new(start as u32, end as u32)
}
