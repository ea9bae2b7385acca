use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{Span, content_profile};

/// Parameters for splitting a span that holds two touching figures.
///
/// This is a heuristic tuned on hand-drawn sheets with roughly equal-width
/// figures; nothing guarantees the valley it finds is the true seam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Start of the valley search window, as a fraction of the span width
    pub window_start: f64,
    /// End (exclusive) of the valley search window
    pub window_end: f64,
    /// Columns dropped on each side of the valley
    pub margin: u32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            window_start: 0.3,
            window_end: 0.7,
            margin: 5,
        }
    }
}

/// Split a merged span at its content valley.
///
/// The valley is the first column with the fewest non-background pixels
/// inside the search window. A span reaching past the strip is clipped to
/// it. Returns `None` when the window is empty or a side would end up with
/// no columns.
pub fn split_merged(
    strip: &RgbImage,
    span: Span,
    threshold: u8,
    config: &SplitConfig,
) -> Option<(Span, Span)> {
    let span = Span::new(span.start, span.end.min(strip.width()));
    if span.start >= span.end {
        return None;
    }
    let width = span.width();
    let sub = image::imageops::crop_imm(strip, span.start, 0, width, strip.height()).to_image();
    let profile = content_profile(&sub, threshold);

    let window_start = fraction_of(width, config.window_start);
    let window_end = fraction_of(width, config.window_end).min(width);
    if window_start >= window_end {
        return None;
    }

    let (offset, _) = profile[window_start as usize..window_end as usize]
        .iter()
        .enumerate()
        .min_by_key(|&(i, &count)| (count, i))?;
    let valley = window_start + u32::try_from(offset).ok()?;

    let left_end = span.start + valley.checked_sub(config.margin)?;
    let right_start = span.start + valley + config.margin;
    if left_end <= span.start || right_start >= span.end {
        return None;
    }

    Some((Span::new(span.start, left_end), Span::new(right_start, span.end)))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "fraction is clamped to [0, 1] and the product fits in u32"
)]
fn fraction_of(width: u32, fraction: f64) -> u32 {
    (f64::from(width) * fraction.clamp(0.0, 1.0)).floor() as u32
}
