use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use image::{ImageFormat, RgbaImage};

use crate::cli::CompressionLevel;
use crate::error::SheetcutError;

/// Save a frame as PNG, optionally with compression
pub fn save_frame_png(
    image: &RgbaImage,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    // Encode to PNG in memory
    let mut png_data = Cursor::new(Vec::new());
    image
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| SheetcutError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    let output_data = if let Some(level) = compress {
        let opts = match level {
            CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
            CompressionLevel::Max => oxipng::Options::max_compression(),
        };
        oxipng::optimize_from_memory(&png_data.into_inner(), &opts).map_err(|e| {
            SheetcutError::PngCompress {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?
    } else {
        png_data.into_inner()
    };

    fs::write(path, output_data).map_err(|e| SheetcutError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
