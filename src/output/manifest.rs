use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::error::SheetcutError;
use crate::frame::{Canvas, Frame, FrameSequence};
use crate::output::frame_filename;

#[derive(Serialize)]
struct Manifest {
    meta: Meta,
    canvas: Size,
    frames: Vec<ManifestFrame>,
}

#[derive(Serialize)]
struct Meta {
    app: &'static str,
    version: &'static str,
    sequence: String,
    revision: u32,
}

#[derive(Serialize)]
struct Size {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct Point {
    x: u32,
    y: u32,
}

#[derive(Serialize)]
struct Bounds {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct ManifestFrame {
    file: String,
    label: String,
    row: usize,
    /// Crop rectangle in the source sheet
    source: Bounds,
    /// Where the frame was placed on the canvas
    offset: Point,
    size: Size,
    mirrored: bool,
}

/// Write `<name>.json` describing every written frame
pub fn write_manifest(
    sequence: &FrameSequence,
    canvas: &Canvas,
    output_dir: &Path,
    name: &str,
    prefix: &str,
) -> Result<PathBuf> {
    let total = sequence.len();
    let frames = sequence
        .iter()
        .enumerate()
        .map(|(index, frame)| frame_to_json(frame, canvas, frame_filename(prefix, index, total)))
        .collect();

    let manifest = Manifest {
        meta: Meta {
            app: "sheetcut",
            version: env!("CARGO_PKG_VERSION"),
            sequence: sequence.name.clone(),
            revision: sequence.version,
        },
        canvas: Size {
            w: canvas.width,
            h: canvas.height,
        },
        frames,
    };

    let json_path = output_dir.join(format!("{}.json", name));
    let content = serde_json::to_string_pretty(&manifest)?;

    fs::write(&json_path, content).map_err(|e| SheetcutError::OutputWrite {
        path: json_path.clone(),
        source: e,
    })?;

    Ok(json_path)
}

fn frame_to_json(frame: &Frame, canvas: &Canvas, file: String) -> ManifestFrame {
    let at = canvas.place(frame.width(), frame.height());

    ManifestFrame {
        file,
        label: frame.label.clone(),
        row: frame.row,
        source: Bounds {
            x: frame.crop.x,
            y: frame.crop.y,
            w: frame.crop.width,
            h: frame.crop.height,
        },
        offset: Point { x: at.x, y: at.y },
        size: Size {
            w: frame.width(),
            h: frame.height(),
        },
        mirrored: frame.mirrored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{HAlign, VAlign};
    use crate::segment::{Rect, Span};
    use image::RgbaImage;

    #[test]
    fn test_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![
            Frame {
                label: "walk".to_string(),
                row: 0,
                span: Span::new(10, 14),
                crop: Rect::new(7, 2, 10, 6),
                mirrored: true,
                image: RgbaImage::new(10, 6),
            },
            Frame {
                label: "aim".to_string(),
                row: 2,
                span: Span::new(0, 20),
                crop: Rect::new(0, 50, 20, 8),
                mirrored: true,
                image: RgbaImage::new(20, 8),
            },
        ];
        let seq = FrameSequence::new("bond", frames);
        let canvas = Canvas::fit(&seq, HAlign::Center, VAlign::Bottom);

        let path = write_manifest(&seq, &canvas, dir.path(), "bond", "frame").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["meta"]["app"], "sheetcut");
        assert_eq!(json["canvas"]["w"], 20);
        assert_eq!(json["canvas"]["h"], 8);
        assert_eq!(json["frames"][0]["file"], "frame-00.png");
        assert_eq!(json["frames"][0]["offset"]["x"], 5);
        assert_eq!(json["frames"][0]["offset"]["y"], 2);
        assert_eq!(json["frames"][0]["source"]["x"], 7);
        assert_eq!(json["frames"][1]["label"], "aim");
        assert_eq!(json["frames"][1]["row"], 2);
    }
}
