//! Configuration: backend URL and state directory.
//!
//! Precedence: command-line flag or `MINDGRID_BACKEND_URL`, then
//! `<state dir>/config.toml`, then the local default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Backend used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

const STATE_DIR: &str = ".mindgrid";
const CONFIG_FILE: &str = "config.toml";

/// Contents of `config.toml`.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_url: String,
    /// Directory holding `state.json` and `config.toml`: one profile.
    pub state_dir: PathBuf,
}

impl Config {
    pub fn resolve(backend_url: Option<String>, state_dir: Option<PathBuf>) -> Result<Self> {
        let state_dir = match state_dir {
            Some(dir) => dir,
            None => default_state_dir()?,
        };

        let backend_url = match backend_url {
            Some(url) => url,
            None => read_file_config(&state_dir)?
                .backend_url
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
        };

        Ok(Self {
            backend_url,
            state_dir,
        })
    }
}

fn default_state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(STATE_DIR))
}

fn read_file_config(state_dir: &Path) -> Result<FileConfig> {
    let path = state_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_backend() {
        let dir = tempdir().unwrap();
        let config = Config::resolve(None, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.state_dir, dir.path());
    }

    #[test]
    fn test_file_then_flag() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "backend_url = \"https://api.mindgrid.test\"\n",
        )
        .unwrap();

        let from_file = Config::resolve(None, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(from_file.backend_url, "https://api.mindgrid.test");

        let from_flag = Config::resolve(
            Some("http://localhost:9000".to_string()),
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(from_flag.backend_url, "http://localhost:9000");
    }

    #[test]
    fn test_bad_config_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "backend_url = [").unwrap();
        let err = Config::resolve(None, Some(dir.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
