//! Runtime configuration resolved from flags and environment.

use crate::error::{GenStudioError, Result};
use std::path::PathBuf;

/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "GENSTUDIO_DATA_DIR";
/// Session API key used when none is saved.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Overrides the API root.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory of the local key-value store.
    pub data_dir: PathBuf,
    /// Key from the environment, used only when no key is saved.
    pub env_api_key: Option<String>,
    /// API root override.
    pub base_url: Option<String>,
}

impl Config {
    /// Resolves configuration from the process environment.
    pub fn from_env(explicit_data_dir: Option<&str>) -> Result<Self> {
        let data_dir = resolve_data_dir(explicit_data_dir)?;
        Ok(Self {
            data_dir,
            env_api_key: non_empty_var(API_KEY_ENV),
            base_url: non_empty_var(BASE_URL_ENV),
        })
    }
}

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. GENSTUDIO_DATA_DIR environment variable (with tilde expansion)
/// 3. System data directory
/// 4. ~/.genstudio
pub fn resolve_data_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    resolve_data_dir_from(
        explicit_path,
        non_empty_var(DATA_DIR_ENV).as_deref(),
        dirs::data_dir(),
        dirs::home_dir(),
    )
}

fn resolve_data_dir_from(
    explicit_path: Option<&str>,
    env_path: Option<&str>,
    system_data_dir: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit_path.or(env_path) {
        return Ok(expand_tilde(path, home.as_deref()));
    }
    if let Some(data_dir) = system_data_dir {
        return Ok(data_dir.join("genstudio"));
    }
    if let Some(home) = home {
        return Ok(home.join(".genstudio"));
    }
    Err(GenStudioError::Config(
        "could not determine data directory: no home or system data directory found".into(),
    ))
}

fn expand_tilde(path: &str, home: Option<&std::path::Path>) -> PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(stripped), Some(home)) => home.join(stripped),
        _ => PathBuf::from(path),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
