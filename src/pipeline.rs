use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::RgbImage;
use log::info;

use crate::cli::CompressionLevel;
use crate::config::CanvasConfig;
use crate::frame::{Canvas, FrameSequence, HAlign, VAlign};
use crate::output::{clear_stale_frames, write_frames, write_manifest};
use crate::segment::{SegmentConfig, SplitConfig};
use crate::sheet::{RowScan, RowSpec, SheetCutter};

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub rows: Vec<RowSpec>,
    pub segment: SegmentConfig,
    pub split: SplitConfig,
    pub padding: u32,
    pub min_width: Option<u32>,
    pub merged_width: Option<u32>,
    pub sequence: Option<Vec<usize>>,
    pub mirror: bool,
    pub halign: HAlign,
    pub valign: VAlign,
    pub canvas: Option<CanvasConfig>,
    pub transparent_background: Option<u8>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            rows: vec![RowSpec::labeled("row-0")],
            segment: SegmentConfig::default(),
            split: SplitConfig::default(),
            padding: 3,
            min_width: None,
            merged_width: None,
            sequence: None,
            mirror: false,
            halign: HAlign::default(),
            valign: VAlign::default(),
            canvas: None,
            transparent_background: None,
        }
    }
}

/// Frames ready to be written, with the canvas they share
pub struct Rendered {
    pub sequence: FrameSequence,
    pub canvas: Canvas,
}

impl Pipeline {
    fn cutter(&self) -> SheetCutter {
        SheetCutter::new(self.segment)
            .padding(self.padding)
            .split(self.split)
            .min_width(self.min_width)
            .merged_width(self.merged_width)
    }

    /// Segment every row of the sheet
    pub fn scan(&self, sheet: &RgbImage) -> Result<Vec<RowScan>> {
        self.cutter().scan(sheet, &self.rows)
    }

    /// Cut the sheet into raw frames, applying only mirroring and keying
    pub fn cut(&self, sheet: &RgbImage) -> Result<FrameSequence> {
        let frames = self.cutter().cut(sheet, &self.rows)?;
        Ok(self.finish(frames))
    }

    /// Cut the sheet and run every in-memory stage up to the canvas
    pub fn build(&self, sheet: &RgbImage) -> Result<Rendered> {
        let frames = self.cutter().cut(sheet, &self.rows)?;
        self.arrange(frames)
    }

    /// Sequence, mirror, key and fit frames that are already cut
    pub fn arrange(&self, frames: FrameSequence) -> Result<Rendered> {
        let frames = match &self.sequence {
            Some(indices) => {
                let selected = frames.select(indices)?;
                info!(
                    "Sequenced {} frames into {}",
                    frames.len(),
                    selected.len()
                );
                selected
            }
            None => frames,
        };
        let sequence = self.finish(frames);

        let canvas = match self.canvas {
            Some(size) => Canvas::fixed(
                &sequence,
                size.width,
                size.height,
                self.halign,
                self.valign,
            )?,
            None => Canvas::fit(&sequence, self.halign, self.valign),
        };
        info!("Normalizing to {}x{}", canvas.width, canvas.height);

        Ok(Rendered { sequence, canvas })
    }

    fn finish(&self, frames: FrameSequence) -> FrameSequence {
        let frames = if self.mirror { frames.mirror() } else { frames };
        match self.transparent_background {
            Some(threshold) => frames.key_out_background(threshold),
            None => frames,
        }
    }
}

/// Write frames to `dir` in one pass, replacing earlier `<prefix>-*.png` files.
///
/// When `canvas` is set every frame is composited onto it; otherwise frames
/// keep their own size. Leftovers from a longer earlier run are removed only
/// after every new frame is written.
pub fn materialize(
    sequence: &FrameSequence,
    canvas: Option<&Canvas>,
    dir: &Path,
    prefix: &str,
    compress: Option<CompressionLevel>,
) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let paths = write_frames(sequence, canvas, dir, prefix, compress)?;
    info!("Wrote {} frames to {}", paths.len(), dir.display());

    let removed = clear_stale_frames(dir, prefix, &paths)?;
    if removed > 0 {
        info!("Removed {} stale {}-*.png files", removed, prefix);
    }

    Ok(paths)
}

/// Write rendered frames plus their JSON manifest
pub fn materialize_rendered(
    rendered: &Rendered,
    dir: &Path,
    name: &str,
    prefix: &str,
    compress: Option<CompressionLevel>,
) -> Result<Vec<PathBuf>> {
    let paths = materialize(
        &rendered.sequence,
        Some(&rendered.canvas),
        dir,
        prefix,
        compress,
    )?;
    let manifest = write_manifest(&rendered.sequence, &rendered.canvas, dir, name, prefix)?;
    info!("Generated {}", manifest.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn fill(sheet: &mut RgbImage, x: (u32, u32), y: (u32, u32), color: Rgb<u8>) {
        for px in x.0..x.1 {
            for py in y.0..y.1 {
                sheet.put_pixel(px, py, color);
            }
        }
    }

    /// Row 0: three figures of growing height. Row 1: one figure and a
    /// fragment too small to keep.
    fn sheet() -> RgbImage {
        let mut sheet = RgbImage::from_pixel(200, 120, WHITE);
        fill(&mut sheet, (10, 30), (30, 55), Rgb([200, 0, 0]));
        fill(&mut sheet, (60, 80), (20, 55), Rgb([0, 200, 0]));
        fill(&mut sheet, (110, 140), (10, 55), Rgb([0, 0, 200]));
        fill(&mut sheet, (20, 60), (70, 110), Rgb([50, 50, 50]));
        fill(&mut sheet, (150, 155), (100, 110), Rgb([50, 50, 50]));
        sheet
    }

    fn pipeline() -> Pipeline {
        let mut aim = RowSpec::labeled("aim");
        aim.min_width = Some(10);
        Pipeline {
            rows: vec![RowSpec::labeled("walk"), aim],
            ..Pipeline::default()
        }
    }

    #[test]
    fn test_cut_keeps_reading_order() {
        let frames = pipeline().cut(&sheet()).unwrap();

        let labels: Vec<_> = frames.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["walk", "walk", "walk", "aim"]);
        assert_eq!(frames.frames[0].span.start, 10);
    }

    #[test]
    fn test_build_sequences_and_normalizes() {
        let pipeline = Pipeline {
            sequence: Some(vec![3, 0, 1, 1]),
            mirror: true,
            ..pipeline()
        };

        let rendered = pipeline.build(&sheet()).unwrap();

        let labels: Vec<_> = rendered
            .sequence
            .iter()
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(labels, vec!["aim", "walk", "walk", "walk"]);
        assert!(rendered.sequence.iter().all(|f| f.mirrored));
        // Only selected frames size the canvas: the 51px third walk figure is dropped
        assert_eq!((rendered.canvas.width, rendered.canvas.height), (46, 46));

        let out = rendered.canvas.render(&rendered.sequence.frames[1]);
        // Walk frame 0 is 26x31, centered and bottom-aligned at (10, 15)
        assert_eq!(out.get_pixel(0, 45), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(9, 40), &Rgba([0, 0, 0, 0]));
        assert_eq!(out.get_pixel(14, 40), &Rgba([200, 0, 0, 255]));
        assert_eq!(out.get_pixel(14, 17), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_build_rejects_bad_sequence() {
        let pipeline = Pipeline {
            sequence: Some(vec![0, 9]),
            ..pipeline()
        };

        assert!(pipeline.build(&sheet()).is_err());
    }

    #[test]
    fn test_fixed_canvas_too_small() {
        let pipeline = Pipeline {
            canvas: Some(CanvasConfig {
                width: 30,
                height: 30,
            }),
            ..pipeline()
        };

        assert!(pipeline.build(&sheet()).is_err());
    }

    #[test]
    fn test_materialize_rendered_replaces_old_frames() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("frame-07.png"), b"stale").unwrap();
        fs::write(dir.path().join("frame-00.png"), b"stale").unwrap();

        let rendered = pipeline().build(&sheet()).unwrap();
        let paths = materialize_rendered(&rendered, dir.path(), "bond", "frame", None).unwrap();

        assert_eq!(paths.len(), 4);
        assert!(!dir.path().join("frame-07.png").exists());
        assert!(dir.path().join("frame-03.png").exists());
        // Overwritten in place, not deleted after the write
        assert!(image::open(dir.path().join("frame-00.png")).is_ok());
        assert!(dir.path().join("bond.json").exists());
    }

    #[test]
    fn test_materialize_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("frames");

        let frames = pipeline().cut(&sheet()).unwrap();
        let paths = materialize(&frames, None, &out, "raw", None).unwrap();

        assert_eq!(paths.len(), 4);
        assert!(out.join("raw-00.png").exists());
    }
}
