mod args;

pub use args::{
    CliArgs, Command, CommonArgs, CompressionLevel, IndexList, InitArgs, LayoutArgs,
    NormalizeArgs,
};
