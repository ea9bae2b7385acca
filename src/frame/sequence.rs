use image::imageops;
use log::debug;

use super::Frame;
use crate::error::SheetcutError;

/// An ordered, named set of frames passed between pipeline stages.
///
/// Every stage returns a new sequence with a bumped `version`, so nothing is
/// written to disk until the last stage is done.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    pub name: String,
    pub version: u32,
    pub frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            frames,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Build a new sequence from frame indices.
    ///
    /// Indices may skip frames, reorder them, or repeat them (e.g. play a walk
    /// cycle twice and hold the last pose).
    pub fn select(&self, indices: &[usize]) -> Result<FrameSequence, SheetcutError> {
        if indices.is_empty() {
            return Err(SheetcutError::EmptySequence);
        }

        let frames = indices
            .iter()
            .map(|&index| {
                self.frames
                    .get(index)
                    .cloned()
                    .ok_or(SheetcutError::FrameIndexOutOfRange {
                        index,
                        len: self.frames.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "{} v{}: selected {} of {} frames",
            self.name,
            self.version + 1,
            frames.len(),
            self.frames.len()
        );

        Ok(self.next(frames))
    }

    /// Flip every frame horizontally
    pub fn mirror(&self) -> FrameSequence {
        let frames = self
            .frames
            .iter()
            .map(|frame| Frame {
                image: imageops::flip_horizontal(&frame.image),
                mirrored: !frame.mirrored,
                ..frame.clone()
            })
            .collect();

        self.next(frames)
    }

    /// Make near-white pixels fully transparent
    pub fn key_out_background(&self, threshold: u8) -> FrameSequence {
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                let mut image = frame.image.clone();
                for pixel in image.pixels_mut() {
                    if pixel.0[..3].iter().all(|&c| c > threshold) {
                        pixel.0[3] = 0;
                    }
                }
                Frame {
                    image,
                    ..frame.clone()
                }
            })
            .collect();

        self.next(frames)
    }

    /// Largest width and height over all frames
    pub fn max_dimensions(&self) -> (u32, u32) {
        self.frames.iter().fold((0, 0), |(w, h), frame| {
            (w.max(frame.width()), h.max(frame.height()))
        })
    }

    fn next(&self, frames: Vec<Frame>) -> FrameSequence {
        FrameSequence {
            name: self.name.clone(),
            version: self.version + 1,
            frames,
        }
    }
}

/// Parse a frame index list such as `0,1,2,8-11,11`.
///
/// Ranges are inclusive and may be written descending (`5-3` is `5,4,3`).
pub fn parse_index_list(s: &str) -> Result<Vec<usize>, SheetcutError> {
    let invalid = || SheetcutError::InvalidIndexList(s.to_string());
    let mut indices = Vec::new();

    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((from, to)) = part.split_once('-') {
            let from: usize = from.trim().parse().map_err(|_e| invalid())?;
            let to: usize = to.trim().parse().map_err(|_e| invalid())?;
            if from <= to {
                indices.extend(from..=to);
            } else {
                indices.extend((to..=from).rev());
            }
        } else {
            indices.push(part.parse().map_err(|_e| invalid())?);
        }
    }

    if indices.is_empty() {
        return Err(invalid());
    }

    Ok(indices)
}
