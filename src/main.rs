use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use sheetcut::cli::{
    CliArgs, Command, CommonArgs, CompressionLevel, InitArgs, LayoutArgs, NormalizeArgs,
};
use sheetcut::config::{
    CompressConfig, LoadedConfig, SheetcutConfig, expand_patterns, make_relative, save_config,
};
use sheetcut::pipeline::{Pipeline, materialize, materialize_rendered};
use sheetcut::segment::SegmentConfig;
use sheetcut::sheet::{RowSpec, load_frame_files, load_sheet};

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    match cli.command {
        Command::Inspect(args) => inspect(&merge_config_with_args(&args)?),
        Command::Cut(args) => cut(&merge_config_with_args(&args)?),
        Command::Build(args) => build(&merge_config_with_args(&args)?),
        Command::Normalize(args) => normalize(&args),
        Command::Init(args) => init(&args),
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("Sheetcut sprite slicer v{}", env!("CARGO_PKG_VERSION"));
}

fn inspect(merged: &MergedConfig) -> Result<()> {
    init_logging(merged.verbose);

    let sheet = load_sheet(&merged.input)?;
    for (i, scan) in merged.pipeline.scan(&sheet)?.iter().enumerate() {
        info!(
            "Row {} ({}, y: {}-{}): {} figures",
            i,
            scan.label,
            scan.y_start,
            scan.y_end,
            scan.spans.len()
        );
        for (j, span) in scan.spans.iter().enumerate() {
            info!(
                "  [{}] x: {}-{} width: {}",
                j,
                span.start,
                span.end,
                span.width()
            );
        }
    }

    Ok(())
}

fn cut(merged: &MergedConfig) -> Result<()> {
    init_logging(merged.verbose);

    let sheet = load_sheet(&merged.input)?;
    let frames = merged.pipeline.cut(&sheet)?;
    for (i, frame) in frames.iter().enumerate() {
        info!(
            "  [{}] {}: {}x{}",
            i,
            frame.label,
            frame.width(),
            frame.height()
        );
    }

    let prefix = merged.prefix_or("raw");
    materialize(&frames, None, &merged.output, prefix, merged.compress)?;

    info!("Done!");
    Ok(())
}

fn build(merged: &MergedConfig) -> Result<()> {
    init_logging(merged.verbose);

    let sheet = load_sheet(&merged.input)?;
    let rendered = merged.pipeline.build(&sheet)?;

    let prefix = merged.prefix_or("frame");
    materialize_rendered(
        &rendered,
        &merged.output,
        &merged.name,
        prefix,
        merged.compress,
    )?;

    info!("Done!");
    Ok(())
}

fn normalize(args: &NormalizeArgs) -> Result<()> {
    init_logging(args.verbose);

    let inputs = expand_patterns(&args.input)?;
    let frames = load_frame_files(&inputs, "frames")?;

    let pipeline = Pipeline {
        sequence: args.sequence.as_ref().map(|s| s.0.clone()),
        mirror: args.mirror,
        ..layout_pipeline(&args.layout, None)
    };
    let rendered = pipeline.arrange(frames)?;

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let prefix = args.prefix.as_deref().unwrap_or("frame");
    materialize_rendered(
        &rendered,
        &output,
        "frames",
        prefix,
        args.layout.compress,
    )?;

    info!("Done!");
    Ok(())
}

fn init(args: &InitArgs) -> Result<()> {
    init_logging(false);

    let config_dir = args
        .path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = SheetcutConfig {
        input: args
            .input
            .as_ref()
            .map(|input| make_relative(input, &config_dir)),
        ..SheetcutConfig::default()
    };
    if !args.rows.is_empty() {
        config.rows = args.rows.iter().map(|label| RowSpec::labeled(label.as_str())).collect();
    }

    save_config(&config, &args.path, args.force)?;
    info!("Wrote {}", args.path.display());
    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    input: PathBuf,
    output: PathBuf,
    name: String,
    prefix: Option<String>,
    pipeline: Pipeline,
    compress: Option<CompressionLevel>,
    verbose: bool,
}

impl MergedConfig {
    /// Prefix given on the command line or in the config, else the command's default
    fn prefix_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.prefix.as_deref().unwrap_or(default)
    }
}

/// Pipeline holding only the canvas settings of `layout`, falling back to the
/// config file and then the defaults.
fn layout_pipeline(layout: &LayoutArgs, config: Option<&SheetcutConfig>) -> Pipeline {
    let defaults = SheetcutConfig::default();
    let config = config.unwrap_or(&defaults);

    Pipeline {
        halign: layout.halign.unwrap_or(config.halign),
        valign: layout.valign.unwrap_or(config.valign),
        canvas: layout.canvas.or(config.canvas),
        transparent_background: layout.transparent.or(config.transparent_background),
        ..Pipeline::default()
    }
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &CommonArgs) -> Result<MergedConfig> {
    // Load config if specified
    let loaded_config = if let Some(config_path) = &args.config {
        Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        )
    } else {
        None
    };
    let config = loaded_config.as_ref().map(|lc| &lc.config);
    let defaults = SheetcutConfig::default();
    let base = config.unwrap_or(&defaults);

    // Sprite sheet: CLI > config
    let input = match (&args.input, &loaded_config) {
        (Some(input), _) => input.clone(),
        (None, Some(lc)) => match lc.resolve_input() {
            Some(input) => input,
            None => bail!("no sprite sheet given on the command line or in the config"),
        },
        // clap's required_unless_present rules this out
        (None, None) => bail!("no sprite sheet given"),
    };

    // Output directory: CLI > config > default
    let output = args.output.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_output_dir())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let name = args.name.clone().unwrap_or_else(|| base.name.clone());

    // Prefix defaults depend on the command, so only set it when asked for
    let prefix = args
        .prefix
        .clone()
        .or_else(|| base.prefix.clone());

    // Rows: CLI labels replace the config rows entirely
    let rows = if args.rows.is_empty() {
        base.rows.clone()
    } else {
        args.rows.iter().map(|label| RowSpec::labeled(label.as_str())).collect()
    };

    let segment = SegmentConfig {
        background_threshold: args
            .background_threshold
            .unwrap_or(base.background_threshold),
        column_background_ratio: args.column_ratio.unwrap_or(base.column_background_ratio),
        min_gap_width: args.min_gap.unwrap_or(base.min_gap_width),
    };
    if !(0.0..=1.0).contains(&segment.column_background_ratio) {
        bail!(
            "column ratio must be between 0 and 1, got {}",
            segment.column_background_ratio
        );
    }

    // Compress: CLI option overrides config
    let compress = if args.layout.compress.is_some() {
        args.layout.compress
    } else {
        base.compress.as_ref().map(|c| match c {
            CompressConfig::Level(n) => CompressionLevel::Level(*n),
            CompressConfig::Max(_) => CompressionLevel::Max,
        })
    };

    let pipeline = Pipeline {
        rows,
        segment,
        split: base.split,
        padding: args.padding.unwrap_or(base.padding),
        min_width: args.min_width.or(base.min_width),
        merged_width: args.merged_width.or(base.merged_width),
        sequence: args
            .sequence
            .as_ref()
            .map(|s| s.0.clone())
            .or_else(|| base.sequence.clone()),
        mirror: args.mirror || base.mirror,
        ..layout_pipeline(&args.layout, config)
    };

    Ok(MergedConfig {
        input,
        output,
        name,
        prefix,
        pipeline,
        compress,
        verbose: args.verbose,
    })
}
