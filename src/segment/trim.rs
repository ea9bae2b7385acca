use image::RgbImage;

use super::{Rect, Span, is_background};
use crate::error::SheetcutError;

/// Half-open vertical pixel range `[top, bottom)` holding a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub top: u32,
    pub bottom: u32,
}

/// Find the first and last rows inside `span` that hold a figure pixel.
///
/// An all-background span yields [`SheetcutError::EmptyFigure`] instead of
/// an inverted range.
pub fn vertical_trim(
    strip: &RgbImage,
    span: Span,
    threshold: u8,
) -> Result<RowBounds, SheetcutError> {
    let end = span.end.min(strip.width());
    let has_content =
        |y: u32| (span.start..end).any(|x| !is_background(strip.get_pixel(x, y), threshold));

    let top = (0..strip.height()).find(|&y| has_content(y));
    let bottom = (0..strip.height()).rev().find(|&y| has_content(y));

    match (top, bottom) {
        (Some(top), Some(bottom)) => Ok(RowBounds {
            top,
            bottom: bottom + 1,
        }),
        _ => Err(SheetcutError::EmptyFigure {
            start: span.start,
            end: span.end,
        }),
    }
}

/// Build the final crop for a trimmed figure, padded on all four sides and
/// clamped to the sheet.
///
/// `strip_y` is the sheet row at which the strip starts.
pub fn padded_crop(
    span: Span,
    bounds: RowBounds,
    strip_y: u32,
    padding: u32,
    sheet_width: u32,
    sheet_height: u32,
) -> Rect {
    let x1 = span.start.saturating_sub(padding);
    let x2 = (span.end + padding).min(sheet_width);
    let y1 = (strip_y + bounds.top).saturating_sub(padding);
    let y2 = (strip_y + bounds.bottom + padding).min(sheet_height);

    Rect::new(x1, y1, x2 - x1, y2 - y1)
}
