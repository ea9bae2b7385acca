use image::{Rgb, RgbImage};
use rayon::prelude::*;

use super::SegmentConfig;

/// Returns true if every channel is brighter than `threshold`
pub fn is_background(pixel: &Rgb<u8>, threshold: u8) -> bool {
    pixel.0.iter().all(|&c| c > threshold)
}

/// Classify every column of the strip as background (`true`) or content.
///
/// A column is background when the fraction of background pixels in it
/// exceeds `column_background_ratio`. Columns are independent, so they are
/// classified in parallel; the result is still indexed by column.
pub fn classify_columns(strip: &RgbImage, config: &SegmentConfig) -> Vec<bool> {
    let (width, height) = strip.dimensions();
    if height == 0 {
        return vec![true; width as usize];
    }

    (0..width)
        .into_par_iter()
        .map(|x| {
            let background = (0..height)
                .filter(|&y| is_background(strip.get_pixel(x, y), config.background_threshold))
                .count();
            background as f64 / f64::from(height) > config.column_background_ratio
        })
        .collect()
}

/// Count the non-background pixels in every column of the strip
pub fn content_profile(strip: &RgbImage, threshold: u8) -> Vec<u32> {
    let (width, height) = strip.dimensions();

    (0..width)
        .into_par_iter()
        .map(|x| {
            (0..height)
                .map(|y| u32::from(!is_background(strip.get_pixel(x, y), threshold)))
                .sum()
        })
        .collect()
}
