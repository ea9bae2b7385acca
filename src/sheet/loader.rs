use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageReader, RgbImage, RgbaImage};
use log::info;
use rayon::prelude::*;

use crate::error::SheetcutError;
use crate::frame::{Frame, FrameSequence};
use crate::segment::{Rect, Span};

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Load a sprite sheet as RGB
pub fn load_sheet(path: &Path) -> Result<RgbImage> {
    if !path.exists() {
        return Err(SheetcutError::InputNotFound(path.to_path_buf()).into());
    }

    let sheet = open_image(path)?.into_rgb8();
    info!(
        "Loaded sheet {} ({}x{})",
        path.display(),
        sheet.width(),
        sheet.height()
    );

    Ok(sheet)
}

/// Split a sheet height into `rows` bands of equal height.
///
/// Leftover pixels at the bottom (when the height is not a multiple of
/// `rows`) are not part of any band.
pub fn strip_ranges(height: u32, rows: u32) -> Result<Vec<(u32, u32)>, SheetcutError> {
    if rows == 0 || rows > height {
        return Err(SheetcutError::InvalidRows { rows, height });
    }

    let row_height = height / rows;
    Ok((0..rows)
        .map(|i| (i * row_height, (i + 1) * row_height))
        .collect())
}

/// Load already-cut frame images (files or directories) in path order.
///
/// Each frame is labeled with its file stem and covers its whole image.
pub fn load_frame_files(inputs: &[impl AsRef<Path>], name: &str) -> Result<FrameSequence> {
    let mut paths = collect_image_paths(inputs)?;
    if paths.is_empty() {
        return Err(SheetcutError::EmptySequence.into());
    }
    paths.sort();

    info!("Loading {} frames...", paths.len());

    let frames = paths
        .par_iter()
        .map(|path| load_frame_file(path))
        .collect::<Result<Vec<_>>>()?;

    Ok(FrameSequence::new(name, frames))
}

fn collect_image_paths(inputs: &[impl AsRef<Path>]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(SheetcutError::InputNotFound(path.to_path_buf()).into());
        }

        if path.is_file() {
            if is_supported_image(path) {
                paths.push(path.to_path_buf());
            }
        } else if path.is_dir() {
            for entry in std::fs::read_dir(path).context("Failed to read directory")? {
                let entry = entry?.path();
                if entry.is_file() && is_supported_image(&entry) {
                    paths.push(entry);
                }
            }
        }
    }

    Ok(paths)
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame_file(path: &Path) -> Result<Frame> {
    let image: RgbaImage = open_image(path)?.into_rgba8();
    let (width, height) = image.dimensions();

    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Frame {
        label,
        row: 0,
        span: Span::new(0, width),
        crop: Rect::new(0, 0, width, height),
        mirrored: false,
        image,
    })
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    let image = ImageReader::open(path)
        .map_err(|e| SheetcutError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .with_guessed_format()
        .map_err(|e| SheetcutError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| SheetcutError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    #[test]
    fn test_strip_ranges() {
        assert_eq!(
            strip_ranges(2400, 3).unwrap(),
            vec![(0, 800), (800, 1600), (1600, 2400)]
        );
        assert_eq!(strip_ranges(10, 3).unwrap(), vec![(0, 3), (3, 6), (6, 9)]);
    }

    #[test]
    fn test_strip_ranges_invalid() {
        assert!(matches!(
            strip_ranges(100, 0),
            Err(SheetcutError::InvalidRows { rows: 0, height: 100 })
        ));
        assert!(strip_ranges(2, 3).is_err());
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("sheet.png")));
        assert!(is_supported_image(Path::new("sheet.JPG")));
        assert!(!is_supported_image(Path::new("sheet.txt")));
        assert!(!is_supported_image(Path::new("sheet")));
    }

    #[test]
    fn test_load_sheet_missing() {
        let result = load_sheet(Path::new("does/not/exist.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_frame_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("frame-01.png"))
            .unwrap();
        RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("frame-00.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let seq = load_frame_files(&[dir.path()], "frames").unwrap();

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.frames[0].label, "frame-00");
        assert_eq!(seq.frames[0].width(), 5);
        assert_eq!(seq.frames[1].label, "frame-01");
    }

    #[test]
    fn test_load_sheet_converts_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let sheet = load_sheet(&path).unwrap();

        assert_eq!(sheet.dimensions(), (4, 4));
        assert_eq!(sheet.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }
}
