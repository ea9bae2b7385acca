use clap::ValueEnum;
use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use super::{Frame, FrameSequence};
use crate::error::SheetcutError;

/// Horizontal placement of a frame on the canvas
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of a frame on the canvas
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VAlign {
    Top,
    Center,
    /// Keeps feet on the same line across frames
    #[default]
    Bottom,
}

/// Offset of a frame's top-left corner on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// A fixed-size transparent canvas every frame is composited onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub halign: HAlign,
    pub valign: VAlign,
}

impl Canvas {
    /// Canvas sized to the largest frame of the sequence
    pub fn fit(sequence: &FrameSequence, halign: HAlign, valign: VAlign) -> Self {
        let (width, height) = sequence.max_dimensions();
        Self {
            width,
            height,
            halign,
            valign,
        }
    }

    /// Canvas with a configured size; every frame must fit inside it
    pub fn fixed(
        sequence: &FrameSequence,
        width: u32,
        height: u32,
        halign: HAlign,
        valign: VAlign,
    ) -> Result<Self, SheetcutError> {
        if let Some(frame) = sequence
            .iter()
            .find(|f| f.width() > width || f.height() > height)
        {
            return Err(SheetcutError::FrameTooLarge {
                label: frame.label.clone(),
                width: frame.width(),
                height: frame.height(),
                canvas_width: width,
                canvas_height: height,
            });
        }

        Ok(Self {
            width,
            height,
            halign,
            valign,
        })
    }

    /// Where a frame of the given size lands on this canvas
    pub fn place(&self, width: u32, height: u32) -> Placement {
        let free_x = self.width.saturating_sub(width);
        let free_y = self.height.saturating_sub(height);

        let x = match self.halign {
            HAlign::Left => 0,
            HAlign::Center => free_x / 2,
            HAlign::Right => free_x,
        };
        let y = match self.valign {
            VAlign::Top => 0,
            VAlign::Center => free_y / 2,
            VAlign::Bottom => free_y,
        };

        Placement { x, y }
    }

    /// Composite a frame onto a fresh transparent canvas
    pub fn render(&self, frame: &Frame) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.width, self.height);
        let at = self.place(frame.width(), frame.height());
        imageops::replace(&mut canvas, &frame.image, i64::from(at.x), i64::from(at.y));
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Rect, Span};
    use image::Rgba;

    fn frame(label: &str, width: u32, height: u32) -> Frame {
        Frame {
            label: label.to_string(),
            row: 0,
            span: Span::new(0, width),
            crop: Rect::new(0, 0, width, height),
            mirrored: false,
            image: RgbaImage::from_pixel(width, height, Rgba([200, 0, 0, 255])),
        }
    }

    fn sequence() -> FrameSequence {
        FrameSequence::new("test", vec![frame("small", 4, 6), frame("big", 10, 12)])
    }

    #[test]
    fn test_fit_uses_max_dimensions() {
        let canvas = Canvas::fit(&sequence(), HAlign::Center, VAlign::Bottom);

        assert_eq!((canvas.width, canvas.height), (10, 12));
    }

    #[test]
    fn test_center_bottom_placement() {
        let canvas = Canvas::fit(&sequence(), HAlign::Center, VAlign::Bottom);

        assert_eq!(canvas.place(4, 6), Placement { x: 3, y: 6 });
        assert_eq!(canvas.place(10, 12), Placement { x: 0, y: 0 });
        // Odd leftover rounds down
        assert_eq!(canvas.place(5, 6), Placement { x: 2, y: 6 });
    }

    #[test]
    fn test_other_alignments() {
        let mut canvas = Canvas::fit(&sequence(), HAlign::Left, VAlign::Top);
        assert_eq!(canvas.place(4, 6), Placement { x: 0, y: 0 });

        canvas.halign = HAlign::Right;
        canvas.valign = VAlign::Center;
        assert_eq!(canvas.place(4, 6), Placement { x: 6, y: 3 });
    }

    #[test]
    fn test_fixed_rejects_oversized_frame() {
        let result = Canvas::fixed(&sequence(), 8, 20, HAlign::Center, VAlign::Bottom);

        assert!(matches!(
            result,
            Err(SheetcutError::FrameTooLarge { ref label, width: 10, .. }) if label == "big"
        ));
    }

    #[test]
    fn test_render_pastes_on_transparent_canvas() {
        let canvas = Canvas::fixed(&sequence(), 10, 12, HAlign::Center, VAlign::Bottom).unwrap();
        let out = canvas.render(&frame("small", 4, 6));

        assert_eq!(out.dimensions(), (10, 12));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(3, 6), &Rgba([200, 0, 0, 255]));
        assert_eq!(out.get_pixel(6, 11), &Rgba([200, 0, 0, 255]));
        assert_eq!(out.get_pixel(7, 11), &Rgba([0, 0, 0, 0]));
    }
}
