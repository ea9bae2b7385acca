mod canvas;
mod frame;
mod sequence;

pub use canvas::{Canvas, HAlign, Placement, VAlign};
pub use frame::Frame;
pub use sequence::{FrameSequence, parse_index_list};
