use image::RgbaImage;

use crate::segment::{Rect, Span};

/// A single animation frame cut from the sheet
#[derive(Debug, Clone)]
pub struct Frame {
    /// Label of the sheet row the frame came from (e.g. "walk")
    pub label: String,
    /// Index of the sheet row
    pub row: usize,
    /// Horizontal span detected by segmentation
    pub span: Span,
    /// Padded crop rectangle in sheet coordinates
    pub crop: Rect,
    /// Whether the pixels have been flipped horizontally
    pub mirrored: bool,
    /// Frame pixels
    pub image: RgbaImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
