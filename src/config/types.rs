use serde::{Deserialize, Serialize};

use crate::frame::{HAlign, VAlign};
use crate::segment::SplitConfig;
use crate::sheet::RowSpec;

/// PNG compression level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// Fixed output canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

/// Sheetcut configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetcutConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Sprite sheet to cut
    pub input: Option<String>,
    /// Output directory for frame files
    pub output_dir: String,
    /// Base name of the JSON manifest
    pub name: String,
    /// Frame file prefix; `frame` for built frames and `raw` for cut ones when unset
    pub prefix: Option<String>,
    /// Sheet rows, top to bottom
    pub rows: Vec<RowSpec>,
    /// A pixel is background when all channels are above this value
    pub background_threshold: u8,
    /// A column is background when more than this fraction of it is background
    pub column_background_ratio: f64,
    /// Shortest run of background columns separating two figures
    pub min_gap_width: u32,
    /// Transparent border kept around every crop
    pub padding: u32,
    /// Default minimum figure width for rows that don't set one
    pub min_width: Option<u32>,
    /// Default merged-figure width for rows that don't set one
    pub merged_width: Option<u32>,
    /// Merged-figure split heuristic
    pub split: SplitConfig,
    /// Frame indices of the final sequence (drop, reorder, repeat)
    pub sequence: Option<Vec<usize>>,
    /// Flip frames horizontally
    pub mirror: bool,
    /// Horizontal placement on the canvas
    pub halign: HAlign,
    /// Vertical placement on the canvas
    pub valign: VAlign,
    /// Fixed canvas size; frames are fitted to the largest one when unset
    pub canvas: Option<CanvasConfig>,
    /// Make pixels brighter than this threshold transparent
    pub transparent_background: Option<u8>,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
}

impl Default for SheetcutConfig {
    fn default() -> Self {
        Self {
            version: 1,
            input: None,
            output_dir: ".".to_string(),
            name: "frames".to_string(),
            prefix: None,
            rows: vec![RowSpec::labeled("row-0")],
            background_threshold: 240,
            column_background_ratio: 0.95,
            min_gap_width: 10,
            padding: 3,
            min_width: None,
            merged_width: None,
            split: SplitConfig::default(),
            sequence: None,
            mirror: false,
            halign: HAlign::Center,
            valign: VAlign::Bottom,
            canvas: None,
            transparent_background: None,
            compress: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "input": "SPRITES.png",
            "rows": [
                { "label": "walk" },
                { "label": "turn", "merged_width": 350 },
                { "label": "aim", "min_width": 150 }
            ],
            "sequence": [0, 1, 2, 3, 4, 5, 8, 9, 11, 6, 12, 13],
            "mirror": true,
            "valign": "bottom"
        }"#;

        let config: SheetcutConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.background_threshold, 240);
        assert_eq!(config.min_gap_width, 10);
        assert_eq!(config.padding, 3);
        assert_eq!(config.rows.len(), 3);
        assert_eq!(config.rows[1].merged_width, Some(350));
        assert_eq!(config.rows[2].min_width, Some(150));
        assert_eq!(config.rows[0].min_width, None);
        assert_eq!(config.split.margin, 5);
        assert_eq!(config.halign, HAlign::Center);
        assert!(config.mirror);
    }

    #[test]
    fn test_compress_config_forms() {
        let level: SheetcutConfig = serde_json::from_str(r#"{ "compress": 4 }"#).unwrap();
        assert!(matches!(level.compress, Some(CompressConfig::Level(4))));

        let max: SheetcutConfig = serde_json::from_str(r#"{ "compress": "max" }"#).unwrap();
        assert!(matches!(max.compress, Some(CompressConfig::Max(_))));
    }
}
