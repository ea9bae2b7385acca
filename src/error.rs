use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetcutError {
    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Cannot split a sheet of height {height} into {rows} rows")]
    InvalidRows { rows: u32, height: u32 },

    #[error("Span {start}..{end} contains no figure pixels")]
    EmptyFigure { start: u32, end: u32 },

    #[error("Frame index {index} is out of range (sequence has {len} frames)")]
    FrameIndexOutOfRange { index: usize, len: usize },

    #[error("Frame sequence is empty")]
    EmptySequence,

    #[error(
        "Frame '{label}' ({width}x{height}) does not fit the canvas ({canvas_width}x{canvas_height})"
    )]
    FrameTooLarge {
        label: String,
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
    },

    #[error("Invalid frame index list '{0}'")]
    InvalidIndexList(String),
}
