use std::path::Path;

use anyhow::{Context, Result, bail};

use super::types::SheetcutConfig;

/// Write a config as pretty JSON.
///
/// An existing file is only replaced when `overwrite` is set.
pub fn save_config(config: &SheetcutConfig, path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "config file already exists: {} (use --force to replace it)",
            path.display()
        );
    }

    let content =
        serde_json::to_string_pretty(config).context("failed to serialize config to JSON")?;

    std::fs::write(path, content)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Express `path` relative to `base` when it lives under it.
///
/// Paths outside `base` are returned unchanged.
pub fn make_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
