use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::retry::EmptyFeedPolicy;

/// Tuning for a single Atom feed fetch and its retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub attempts: u32,
    pub attempt_interval_ms: u64,
    pub timeout_ms: u64,
    pub keep_alive_ms: u64,
    pub empty_feed: EmptyFeedPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            attempt_interval_ms: 60_000,
            timeout_ms: 10_000,
            keep_alive_ms: 1_000,
            empty_feed: EmptyFeedPolicy::Accept,
        }
    }
}

impl FetchConfig {
    pub fn attempt_interval(&self) -> Duration {
        Duration::from_millis(self.attempt_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.keep_alive_ms)
    }
}

/// Per-cycle limits for the batch tag fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Repositories beyond this many are served from the tag cache.
    pub max_tags_to_fetch: usize,
    pub feed_base_url: String,
    pub include_raw_entry: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_tags_to_fetch: 500,
            feed_base_url: "https://github.com".to_string(),
            include_raw_entry: false,
        }
    }
}

/// Global events monitor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between iteration starts.
    pub interval_secs: u64,
    /// Seconds after which the upstream resets its rate limit.
    pub cycle_secs: u64,
    pub pages: u32,
    pub per_page: u32,
    pub timeout_ms: u64,
    /// Capacity of the seen-event window.
    pub track_events_for_duplicates: usize,
    pub events_url: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            cycle_secs: 3600,
            pages: 3,
            per_page: 100,
            timeout_ms: 5_000,
            track_events_for_duplicates: 200,
            events_url: "https://api.github.com/events".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// URLs of every page polled per iteration, `page` counting from 1.
    pub fn page_urls(&self) -> Vec<String> {
        (1..=self.pages)
            .map(|page| format!("{}?per_page={}&page={}", self.events_url, self.per_page, page))
            .collect()
    }

    pub fn trace_loaded(&self) {
        info!(
            interval_secs = self.interval_secs,
            cycle_secs = self.cycle_secs,
            pages = self.pages,
            window = self.track_events_for_duplicates,
            "Loaded MonitorConfig"
        );
        debug!(?self, "MonitorConfig loaded (full debug)");
    }
}
