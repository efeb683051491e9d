//! Config file loading (`thaw.toml`) with env overrides.
//!
//! Precedence, lowest to highest: built-in defaults, the config file, env
//! vars, CLI flags (applied by the CLI layer).

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "thaw.toml";
pub const ENV_CONFIG: &str = "THAW_CONFIG";
pub const ENV_OUTPUT_PREFIX: &str = "THAW_OUTPUT_PREFIX";
pub const ENV_JOBS: &str = "THAW_JOBS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read failed at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse failed at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for output JSONL files.
    pub output_prefix: String,
    /// Journals decoded in parallel.
    pub jobs: usize,
    pub logging: LoggingConfig,
}

impl Config {
    /// Built-in defaults with env overrides still honored; what the binary
    /// runs with when the config file itself is unusable.
    pub fn fallback() -> Self {
        let mut config = Config::default();
        apply_env_overrides(&mut config);
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_prefix: "decoded/".to_string(),
            jobs: default_jobs(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

pub fn config_path() -> PathBuf {
    std::env::var_os(ENV_CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Loads the config file if present, then applies env overrides.
pub fn load() -> Result<Config, ConfigError> {
    let path = config_path();
    let mut config = if path.is_file() {
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides(
        config,
        std::env::var(ENV_OUTPUT_PREFIX).ok(),
        std::env::var(ENV_JOBS).ok(),
    );
}

fn apply_overrides(config: &mut Config, output_prefix: Option<String>, jobs: Option<String>) {
    if let Some(prefix) = output_prefix {
        config.output_prefix = prefix;
    }
    if let Some(jobs) = jobs.and_then(|raw| raw.parse().ok()) {
        config.jobs = jobs;
    }
}
