mod column;
mod rect;
mod span;
mod split;
mod trim;

pub use column::{classify_columns, content_profile, is_background};
pub use rect::Rect;
pub use span::{Span, find_spans, spans_from_columns};
pub use split::{SplitConfig, split_merged};
pub use trim::{RowBounds, padded_crop, vertical_trim};

/// Thresholds for figure segmentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
    /// A pixel is background when all channels are above this value
    pub background_threshold: u8,
    /// A column is background when more than this fraction of it is background
    pub column_background_ratio: f64,
    /// Shortest run of background columns that separates two figures
    pub min_gap_width: u32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            background_threshold: 240,
            column_background_ratio: 0.95,
            min_gap_width: 10,
        }
    }
}
