use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

use super::save_frame_png;
use crate::cli::CompressionLevel;
use crate::error::SheetcutError;
use crate::frame::{Canvas, FrameSequence};

/// File name of the frame at `index` (`walk-00.png`, `walk-01.png`, ...).
///
/// Indices are padded to at least two digits, more for long sequences.
pub fn frame_filename(prefix: &str, index: usize, total: usize) -> String {
    let digits = total.saturating_sub(1).to_string().len().max(2);
    format!("{prefix}-{index:0digits$}.png")
}

/// Remove `<prefix>-*.png` files left over from an earlier run, except the
/// paths in `keep`
pub fn clear_stale_frames(dir: &Path, prefix: &str, keep: &[PathBuf]) -> Result<usize> {
    let pattern = format!(
        "{}/{}-*.png",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(prefix)
    );

    let entries =
        glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut removed = 0;
    for entry in entries {
        let path = entry.with_context(|| format!("failed to read glob entry: {pattern}"))?;
        if keep.iter().any(|kept| kept.file_name() == path.file_name()) {
            continue;
        }
        fs::remove_file(&path).map_err(|e| SheetcutError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;
        debug!("Removed stale {}", path.display());
        removed += 1;
    }

    Ok(removed)
}

/// Save every frame under `dir`, composited onto `canvas` when one is given.
///
/// Returns the written paths in sequence order.
pub fn write_frames(
    sequence: &FrameSequence,
    canvas: Option<&Canvas>,
    dir: &Path,
    prefix: &str,
    compress: Option<CompressionLevel>,
) -> Result<Vec<PathBuf>> {
    let total = sequence.len();

    sequence
        .frames
        .par_iter()
        .enumerate()
        .map(|(index, frame)| {
            let path = dir.join(frame_filename(prefix, index, total));
            match canvas {
                Some(canvas) => save_frame_png(&canvas.render(frame), &path, compress)?,
                None => save_frame_png(&frame.image, &path, compress)?,
            }
            Ok::<_, anyhow::Error>(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, HAlign, VAlign};
    use crate::segment::{Rect, Span};
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_frame_filename() {
        assert_eq!(frame_filename("frame", 0, 12), "frame-00.png");
        assert_eq!(frame_filename("frame", 7, 1), "frame-07.png");
        assert_eq!(frame_filename("raw", 5, 100), "raw-05.png");
        assert_eq!(frame_filename("raw", 5, 101), "raw-005.png");
    }

    #[test]
    fn test_clear_stale_frames() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame-00.png", "frame-01.png", "raw-00.png", "frame.json"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let removed = clear_stale_frames(dir.path(), "frame", &[]).unwrap();

        assert_eq!(removed, 2);
        assert!(!dir.path().join("frame-00.png").exists());
        assert!(dir.path().join("raw-00.png").exists());
        assert!(dir.path().join("frame.json").exists());
    }

    #[test]
    fn test_clear_stale_frames_keeps_fresh_output() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame-00.png", "frame-01.png", "frame-02.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let keep = vec![dir.path().join("frame-00.png"), dir.path().join("frame-01.png")];

        let removed = clear_stale_frames(dir.path(), "frame", &keep).unwrap();

        assert_eq!(removed, 1);
        assert!(dir.path().join("frame-00.png").exists());
        assert!(dir.path().join("frame-01.png").exists());
        assert!(!dir.path().join("frame-02.png").exists());
    }

    #[test]
    fn test_write_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames = [(2, 3), (4, 5)]
            .into_iter()
            .map(|(w, h)| Frame {
                label: "walk".to_string(),
                row: 0,
                span: Span::new(0, w),
                crop: Rect::new(0, 0, w, h),
                mirrored: false,
                image: RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255])),
            })
            .collect();
        let seq = FrameSequence::new("test", frames);
        let canvas = Canvas::fit(&seq, HAlign::Center, VAlign::Bottom);

        let paths = write_frames(&seq, Some(&canvas), dir.path(), "frame", None).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("frame-01.png"));
        for path in &paths {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (4, 5));
        }

        let raw = write_frames(&seq, None, dir.path(), "raw", None).unwrap();
        let first = image::open(&raw[0]).unwrap();
        assert_eq!((first.width(), first.height()), (2, 3));
    }
}
