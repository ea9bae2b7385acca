mod load;
mod save;
mod types;

pub use load::{LoadedConfig, expand_patterns};
pub use save::{make_relative, save_config};
pub use types::{CanvasConfig, CompressConfig, SheetcutConfig};
