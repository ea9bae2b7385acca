use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CanvasConfig;
use crate::error::SheetcutError;
use crate::frame::{HAlign, VAlign, parse_index_list};

#[derive(Parser, Debug)]
#[command(name = "sheetcut")]
#[command(version, about = "Sprite sheet slicer", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the figure spans found in every row, without writing anything
    Inspect(CommonArgs),
    /// Cut the sheet into raw, unnormalized frames for inspection
    Cut(CommonArgs),
    /// Run the full pipeline: cut, sequence, mirror, normalize, write
    Build(CommonArgs),
    /// Normalize already-cut frame files onto a common canvas
    Normalize(NormalizeArgs),
    /// Write a config file with the default settings
    Init(InitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Sprite sheet image
    #[arg(required_unless_present = "config")]
    pub input: Option<PathBuf>,

    /// Load settings from a .sheetcut config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for frame files [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base name of the JSON manifest [default: frames]
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Frame file prefix [default: frame, raw for the cut command]
    #[arg(long)]
    pub prefix: Option<String>,

    /// Comma-separated row labels, top to bottom; the count sets the row split
    #[arg(long, value_delimiter = ',', value_name = "LABELS")]
    pub rows: Vec<String>,

    /// A pixel is background when all channels exceed this value [default: 240]
    #[arg(long, value_name = "0-255")]
    pub background_threshold: Option<u8>,

    /// A column is background when more than this fraction is background [default: 0.95]
    #[arg(long, value_name = "RATIO")]
    pub column_ratio: Option<f64>,

    /// Shortest background run that separates two figures [default: 10]
    #[arg(long, value_name = "PIXELS")]
    pub min_gap: Option<u32>,

    /// Border kept around every crop [default: 3]
    #[arg(short, long)]
    pub padding: Option<u32>,

    /// Drop figures narrower than this (rows without their own limit)
    #[arg(long, value_name = "PIXELS")]
    pub min_width: Option<u32>,

    /// Split figures wider than this (rows without their own limit)
    #[arg(long, value_name = "PIXELS")]
    pub merged_width: Option<u32>,

    /// Frame indices of the final sequence, e.g. "0-5,0-5,8,6,7,11,11"
    #[arg(short, long, value_name = "INDICES")]
    pub sequence: Option<IndexList>,

    /// Flip frames horizontally
    #[arg(long)]
    pub mirror: bool,

    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Canvas and encoding options shared by the writing commands
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Horizontal placement on the canvas [default: center]
    #[arg(long, value_enum)]
    pub halign: Option<HAlign>,

    /// Vertical placement on the canvas [default: bottom]
    #[arg(long, value_enum)]
    pub valign: Option<VAlign>,

    /// Fixed canvas size, e.g. 420x760 [default: largest frame]
    #[arg(long, value_name = "WxH")]
    pub canvas: Option<CanvasConfig>,

    /// Make pixels brighter than this threshold transparent
    #[arg(long, value_name = "0-255")]
    pub transparent: Option<u8>,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Frame images, directories, or glob patterns such as "frames/raw-*.png"
    #[arg(required = true)]
    pub input: Vec<String>,

    /// Output directory [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output frame file prefix [default: frame]
    #[arg(long)]
    pub prefix: Option<String>,

    /// Frame indices to keep, in order, counted over the sorted inputs
    #[arg(short, long, value_name = "INDICES")]
    pub sequence: Option<IndexList>,

    /// Flip frames horizontally
    #[arg(long)]
    pub mirror: bool,

    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Config file to create
    #[arg(default_value = "sheet.sheetcut")]
    pub path: PathBuf,

    /// Sprite sheet the config should point at
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Comma-separated row labels, top to bottom
    #[arg(long, value_delimiter = ',', value_name = "LABELS")]
    pub rows: Vec<String>,

    /// Replace an existing config file
    #[arg(short, long)]
    pub force: bool,
}

/// A parsed frame index list (see [`parse_index_list`])
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexList(pub Vec<usize>);

impl std::str::FromStr for IndexList {
    type Err = SheetcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_index_list(s).map(IndexList)
    }
}

impl std::str::FromStr for CanvasConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("canvas size must look like WIDTHxHEIGHT, got {}", s))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_e| format!("invalid canvas width: {}", w))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_e| format!("invalid canvas height: {}", h))?;
        if width == 0 || height == 0 {
            return Err(format!("canvas size must be non-zero, got {}", s));
        }
        Ok(CanvasConfig { width, height })
    }
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}
