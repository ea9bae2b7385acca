use anyhow::Result;
use image::{DynamicImage, RgbImage, imageops};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::strip_ranges;
use crate::error::SheetcutError;
use crate::frame::{Frame, FrameSequence};
use crate::segment::{
    Rect, SegmentConfig, Span, SplitConfig, find_spans, padded_crop, split_merged, vertical_trim,
};

/// Per-row cutting policy.
///
/// Width limits left unset fall back to the cutter's sheet-wide values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowSpec {
    /// Label given to every frame cut from this row
    pub label: String,
    /// Spans narrower than this are dropped (stray fragments)
    pub min_width: Option<u32>,
    /// Spans wider than this are assumed to be two merged figures
    pub merged_width: Option<u32>,
}

impl RowSpec {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Spans found in one sheet row, before any width policy is applied
#[derive(Debug, Clone)]
pub struct RowScan {
    pub label: String,
    pub y_start: u32,
    pub y_end: u32,
    pub spans: Vec<Span>,
}

/// Cuts a sprite sheet into frames, row by row
pub struct SheetCutter {
    pub segment: SegmentConfig,
    pub split: SplitConfig,
    pub padding: u32,
    pub min_width: Option<u32>,
    pub merged_width: Option<u32>,
}

impl SheetCutter {
    pub fn new(segment: SegmentConfig) -> Self {
        Self {
            segment,
            split: SplitConfig::default(),
            padding: 3,
            min_width: None,
            merged_width: None,
        }
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    pub fn min_width(mut self, min_width: Option<u32>) -> Self {
        self.min_width = min_width;
        self
    }

    pub fn merged_width(mut self, merged_width: Option<u32>) -> Self {
        self.merged_width = merged_width;
        self
    }

    /// Segment every row without cutting anything
    pub fn scan(&self, sheet: &RgbImage, rows: &[RowSpec]) -> Result<Vec<RowScan>> {
        let rows_count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let ranges = strip_ranges(sheet.height(), rows_count)?;

        Ok(rows
            .iter()
            .zip(ranges)
            .map(|(row, (y_start, y_end))| {
                let strip = row_strip(sheet, y_start, y_end);
                RowScan {
                    label: row.label.clone(),
                    y_start,
                    y_end,
                    spans: find_spans(&strip, &self.segment),
                }
            })
            .collect())
    }

    /// Cut every row of the sheet into frames, in reading order
    pub fn cut(&self, sheet: &RgbImage, rows: &[RowSpec]) -> Result<FrameSequence> {
        let scans = self.scan(sheet, rows)?;
        let mut frames = Vec::new();

        for (row_index, (row, scan)) in rows.iter().zip(&scans).enumerate() {
            info!(
                "Row {} ({}): found {} figures",
                row_index,
                row.label,
                scan.spans.len()
            );

            let strip = row_strip(sheet, scan.y_start, scan.y_end);
            let mut previous: Option<Rect> = None;

            for span in self.apply_width_policy(&strip, row, &scan.spans) {
                let bounds = match vertical_trim(&strip, span, self.segment.background_threshold) {
                    Ok(bounds) => bounds,
                    Err(e @ SheetcutError::EmptyFigure { .. }) => {
                        warn!("Row {}: skipping {}", row_index, e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                let crop = padded_crop(
                    span,
                    bounds,
                    scan.y_start,
                    self.padding,
                    sheet.width(),
                    sheet.height(),
                );
                if previous.is_some_and(|p| p.intersects(&crop)) {
                    warn!(
                        "Row {}: crop at x={} overlaps the previous frame",
                        row_index, crop.x
                    );
                }
                previous = Some(crop);

                debug!(
                    "  Frame {:02}: {}x{} (x: {}-{})",
                    frames.len(),
                    crop.width,
                    crop.height,
                    crop.x,
                    crop.right()
                );

                let image = imageops::crop_imm(sheet, crop.x, crop.y, crop.width, crop.height)
                    .to_image();
                frames.push(Frame {
                    label: row.label.clone(),
                    row: row_index,
                    span,
                    crop,
                    mirrored: false,
                    image: DynamicImage::ImageRgb8(image).into_rgba8(),
                });
            }
        }

        info!("Cut {} frames", frames.len());
        Ok(FrameSequence::new("frames", frames))
    }

    /// Drop narrow fragments and split spans wide enough to hold two figures
    fn apply_width_policy(&self, strip: &RgbImage, row: &RowSpec, spans: &[Span]) -> Vec<Span> {
        let min_width = row.min_width.or(self.min_width);
        let merged_width = row.merged_width.or(self.merged_width);
        let mut kept = Vec::with_capacity(spans.len());

        for &span in spans {
            if min_width.is_some_and(|min| span.width() < min) {
                debug!("Skipping fragment {}..{} ({}px)", span.start, span.end, span.width());
                continue;
            }

            if merged_width.is_some_and(|max| span.width() > max) {
                match split_merged(
                    strip,
                    span,
                    self.segment.background_threshold,
                    &self.split,
                ) {
                    Some((left, right)) => {
                        debug!(
                            "Splitting merged span {}..{} at {}..{}",
                            span.start, span.end, left.end, right.start
                        );
                        kept.push(left);
                        kept.push(right);
                    }
                    None => {
                        warn!(
                            "Span {}..{} is {}px wide but has no split point; keeping it whole",
                            span.start,
                            span.end,
                            span.width()
                        );
                        kept.push(span);
                    }
                }
                continue;
            }

            kept.push(span);
        }

        kept
    }
}

fn row_strip(sheet: &RgbImage, y_start: u32, y_end: u32) -> RgbImage {
    imageops::crop_imm(sheet, 0, y_start, sheet.width(), y_end - y_start).to_image()
}
