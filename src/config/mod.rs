pub mod schema;

pub use schema::{ConfigError, ToolRunnerConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Config file name inside the home directory.
pub const CONFIG_FILE: &str = "toolrunner.toml";

/// Default toolrunner home directory (~/.toolrunner).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".toolrunner"))
        .unwrap_or_else(|| PathBuf::from(".toolrunner"))
}

/// Resolve a path that may contain `~` to an absolute path.
pub fn resolve_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<ToolRunnerConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read toolrunner config file")?;
        let config: ToolRunnerConfig =
            toml::from_str(&contents).context("Failed to parse toolrunner config (TOML)")?;
        Ok(config)
    } else {
        Ok(ToolRunnerConfig::default())
    }
}

/// Load the config file from `home_dir`, overlay the environment and validate.
pub fn load_effective(home_dir: &Path) -> Result<ToolRunnerConfig> {
    let path = home_dir.join(CONFIG_FILE);
    let mut config = load_config(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg.max_rounds, 10);
        assert_eq!(cfg.remote_timeout_secs, 30);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model = \"gemini-2.0-flash\"\nmax_rounds = 3\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.model, "gemini-2.0-flash");
        assert_eq!(cfg.max_rounds, 3);
        assert_eq!(cfg.query_api, "http://localhost:8000/query");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "max_rounds = \"many\"").unwrap();
        assert!(load_config(&path).is_err());
    }
}
