pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod output;
pub mod pipeline;
pub mod segment;
pub mod sheet;

pub use cli::{CliArgs, Command, CommonArgs};
pub use error::SheetcutError;
pub use frame::{Canvas, Frame, FrameSequence};
pub use pipeline::Pipeline;
pub use segment::{SegmentConfig, Span, find_spans};
pub use sheet::{RowSpec, SheetCutter};
