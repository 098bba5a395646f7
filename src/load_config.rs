//! `load_config`: reads the YAML config file and layers environment overrides on top.
//!
//! Every section is optional; anything left out takes the defaults of the core config types.
//! Environment variables win over the file:
//!
//! | variable | field |
//! |---|---|
//! | `TAGWATCH_EVENTS_MONITORING_INTERVAL` | `monitor.interval_secs` |
//! | `TAGWATCH_EVENTS_MONITORING_CYCLE` | `monitor.cycle_secs` |
//! | `TAGWATCH_MAX_TAGS_TO_FETCH` | `batch.max_tags_to_fetch` |
//! | `TAGWATCH_TRACK_EVENTS_FOR_DUPLICATES` | `monitor.track_events_for_duplicates` |
//! | `TAGWATCH_QUEUE_URL` | `queue.url` |
//! | `TAGWATCH_ACCESS_TOKENS` | `access_tokens` (comma separated) |
//!
//! Errors are `anyhow::Error` and surface at the CLI boundary.

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tagwatch_core::config::{BatchConfig, FetchConfig, MonitorConfig};
use tagwatch_core::fetch_tags::RepoGroup;
use tracing::{error, info};

pub const ENV_MONITORING_INTERVAL: &str = "TAGWATCH_EVENTS_MONITORING_INTERVAL";
pub const ENV_MONITORING_CYCLE: &str = "TAGWATCH_EVENTS_MONITORING_CYCLE";
pub const ENV_MAX_TAGS_TO_FETCH: &str = "TAGWATCH_MAX_TAGS_TO_FETCH";
pub const ENV_TRACK_EVENTS_FOR_DUPLICATES: &str = "TAGWATCH_TRACK_EVENTS_FOR_DUPLICATES";
pub const ENV_QUEUE_URL: &str = "TAGWATCH_QUEUE_URL";
pub const ENV_ACCESS_TOKENS: &str = "TAGWATCH_ACCESS_TOKENS";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueSection {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub fetch: FetchConfig,
    pub batch: BatchConfig,
    pub monitor: MonitorConfig,
    pub queue: QueueSection,
    /// JSON file backing the tag cache.
    pub cache_path: PathBuf,
    pub access_tokens: Vec<String>,
    pub repos: Vec<RepoGroup>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            batch: BatchConfig::default(),
            monitor: MonitorConfig::default(),
            queue: QueueSection::default(),
            cache_path: PathBuf::from("tag_cache.json"),
            access_tokens: Vec::new(),
            repos: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.interval_secs < 1 {
            bail!("monitor.interval_secs must be at least 1");
        }
        if self.monitor.pages < 1 {
            bail!("monitor.pages must be at least 1");
        }
        if self.fetch.attempts < 1 {
            bail!("fetch.attempts must be at least 1");
        }
        Ok(())
    }

    /// The queue URL, required by the monitor command.
    pub fn queue_url(&self) -> Result<&str> {
        self.queue
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("queue.url is not configured (set it or {ENV_QUEUE_URL})"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(interval) = env_number(ENV_MONITORING_INTERVAL)? {
            self.monitor.interval_secs = interval;
        }
        if let Some(cycle) = env_number(ENV_MONITORING_CYCLE)? {
            self.monitor.cycle_secs = cycle;
        }
        if let Some(max) = env_number(ENV_MAX_TAGS_TO_FETCH)? {
            self.batch.max_tags_to_fetch = max;
        }
        if let Some(window) = env_number(ENV_TRACK_EVENTS_FOR_DUPLICATES)? {
            self.monitor.track_events_for_duplicates = window;
        }
        if let Ok(url) = env::var(ENV_QUEUE_URL) {
            self.queue.url = Some(url);
        }
        if let Ok(raw) = env::var(ENV_ACCESS_TOKENS) {
            self.access_tokens = split_tokens(&raw);
        }
        Ok(())
    }
}

fn env_number<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => {
                info!(variable = name, "Applied environment override");
                Ok(Some(value))
            }
            Err(e) => {
                error!(variable = name, value = %raw, error = %e, "Invalid numeric environment override");
                Err(anyhow!("Invalid value {raw:?} for {name}: {e}"))
            }
        },
        Err(_) => Ok(None),
    }
}

/// Splits a comma separated token list, dropping blanks.
pub fn split_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads the YAML config at `path`, applies environment overrides and validates the result.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow!("Failed to read config file {:?}: {}", path_ref, e));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.apply_env_overrides()?;
    config.validate()?;

    info!(
        repos = config.repos.len(),
        tokens = config.access_tokens.len(),
        queue_configured = config.queue.url.is_some(),
        "Configuration loaded"
    );
    Ok(config)
}
