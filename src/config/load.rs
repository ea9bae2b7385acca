use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::types::SheetcutConfig;

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: SheetcutConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: SheetcutConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve the sprite sheet path relative to the config file directory.
    pub fn resolve_input(&self) -> Option<PathBuf> {
        self.config
            .input
            .as_ref()
            .map(|input| self.config_dir.join(input))
    }

    /// Resolve the output directory relative to the config file directory.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.config_dir.join(&self.config.output_dir)
    }
}

/// Expand file paths and glob patterns into concrete paths.
///
/// Plain paths are passed through untouched; a glob pattern that matches
/// nothing is an error.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        if !is_glob_pattern(pattern) {
            results.push(PathBuf::from(pattern));
            continue;
        }

        let before = results.len();
        let paths =
            glob::glob(pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?;
        for entry in paths {
            let path = entry.with_context(|| format!("failed to read glob entry: {}", pattern))?;
            results.push(path);
        }
        if results.len() == before {
            bail!("no files match {}", pattern);
        }
    }

    Ok(results)
}

/// Check if a pattern contains glob characters.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("raw-*.png"));
        assert!(is_glob_pattern("frames/**/*.png"));
        assert!(is_glob_pattern("raw-0?.png"));
        assert!(is_glob_pattern("raw-[0-5][0-9].png"));
        assert!(!is_glob_pattern("raw-00.png"));
        assert!(!is_glob_pattern("frames/raw-00.png"));
    }

    #[test]
    fn test_expand_patterns() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["raw-00.png", "raw-01.png", "frame-00.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let glob = dir.path().join("raw-*.png").to_string_lossy().into_owned();
        let plain = dir.path().join("frame-00.png").to_string_lossy().into_owned();

        let mut paths = expand_patterns(&[glob, plain]).unwrap();
        paths.sort();

        assert_eq!(
            paths,
            vec![
                dir.path().join("frame-00.png"),
                dir.path().join("raw-00.png"),
                dir.path().join("raw-01.png"),
            ]
        );
    }

    #[test]
    fn test_expand_patterns_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let glob = dir.path().join("*.png").to_string_lossy().into_owned();

        assert!(expand_patterns(&[glob]).is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bond.sheetcut");
        std::fs::write(
            &path,
            r#"{ "input": "art/SPRITES.png", "output_dir": "public/frames" }"#,
        )
        .unwrap();

        let loaded = LoadedConfig::load(&path).unwrap();

        assert_eq!(loaded.config_dir, dir.path());
        assert_eq!(
            loaded.resolve_input(),
            Some(dir.path().join("art/SPRITES.png"))
        );
        assert_eq!(loaded.resolve_output_dir(), dir.path().join("public/frames"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.sheetcut");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(LoadedConfig::load(&path).is_err());
    }
}
