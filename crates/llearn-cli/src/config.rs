//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use llearn_core::progress::{BlobProgressStore, FileStorage};
use llearn_core::session::{SessionConfig, DEFAULT_SOLUTION_THRESHOLD};

/// Top-level llearn configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlearnConfig {
    /// Directory (or single file) holding lesson content.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    /// Directory the progress blob is written to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Checks required before the sample solution can be revealed.
    #[serde(default = "default_solution_after_attempts")]
    pub solution_after_attempts: u32,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./content")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./.llearn")
}
fn default_solution_after_attempts() -> u32 {
    DEFAULT_SOLUTION_THRESHOLD
}

impl Default for LlearnConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            data_dir: default_data_dir(),
            solution_after_attempts: default_solution_after_attempts(),
        }
    }
}

impl LlearnConfig {
    /// Content location, preferring an explicit command-line override.
    pub fn content_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override.unwrap_or_else(|| self.content_dir.clone())
    }

    pub fn progress_store(&self) -> BlobProgressStore<FileStorage> {
        BlobProgressStore::new(FileStorage::new(&self.data_dir))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            solution_after_attempts: self.solution_after_attempts,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `llearn.toml` in the current directory
/// 2. `~/.config/llearn/config.toml`
///
/// Environment variable overrides: `LLEARN_CONTENT_DIR`, `LLEARN_DATA_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<LlearnConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("llearn.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LlearnConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LlearnConfig::default(),
    };

    if let Ok(dir) = std::env::var("LLEARN_CONTENT_DIR") {
        config.content_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("LLEARN_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }

    if config.solution_after_attempts < DEFAULT_SOLUTION_THRESHOLD {
        tracing::warn!(
            "solution_after_attempts = {} is below the minimum, using {}",
            config.solution_after_attempts,
            DEFAULT_SOLUTION_THRESHOLD
        );
        config.solution_after_attempts = DEFAULT_SOLUTION_THRESHOLD;
    }

    config.content_dir = resolve_path(&config.content_dir);
    config.data_dir = resolve_path(&config.data_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("llearn"))
}
