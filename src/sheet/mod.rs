mod cutter;
mod loader;

pub use cutter::{RowScan, RowSpec, SheetCutter};
pub use loader::{load_frame_files, load_sheet, strip_ranges};
