mod format;
mod frames;
mod manifest;

pub use format::save_frame_png;
pub use frames::{clear_stale_frames, frame_filename, write_frames};
pub use manifest::write_manifest;
