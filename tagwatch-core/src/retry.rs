//! Retry Policy for Atom feed fetches.
//!
//! Each call walks `Attempting(n) -> Success | Waiting -> Attempting(n+1) | Failed`:
//!
//! - `BadRequest` (upstream 4xx other than 429) fails at once.
//! - Every other failure waits a fixed interval and tries again while attempts remain.
//! - When attempts run out the last observed error is returned.
//!
//! An [`AttemptCounter`] can be handed in to total the number of HTTP attempts made over a
//! batch. It does nothing until [`AttemptCounter::track`] is called.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::atom::{self, TagEntry};
use crate::config::FetchConfig;
use crate::contract::FeedSource;
use crate::error::FetchError;

/// What a reachable feed with zero entries means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFeedPolicy {
    /// An empty feed is a valid, empty result.
    #[default]
    Accept,
    /// An empty feed is a `NoEntries` failure and is retried.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
    pub timeout: Duration,
    pub empty_feed: EmptyFeedPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            attempts: config.attempts,
            interval: config.attempt_interval(),
            timeout: config.timeout(),
            empty_feed: config.empty_feed,
        }
    }
}

impl RetryPolicy {
    /// Fetch and parse the feed at `url`, retrying transient failures.
    pub async fn fetch_tags<S>(
        &self,
        source: &S,
        url: &str,
        include_raw_entry: bool,
        counter: &AttemptCounter,
    ) -> Result<Vec<TagEntry>, FetchError>
    where
        S: FeedSource + ?Sized,
    {
        let max_attempts = self.attempts.max(1);
        let mut attempts = 0;

        let outcome = loop {
            attempts += 1;
            match self.attempt(source, url, include_raw_entry).await {
                Ok(entries) => break Ok(entries),
                Err(error) => {
                    warn!(url, error = %error, attempts, "fetch_atom_error");
                    if !error.is_retryable() || attempts >= max_attempts {
                        break Err(error);
                    }
                    tokio::time::sleep(self.interval).await;
                }
            }
        };

        counter.record(attempts);
        outcome
    }

    async fn attempt<S>(
        &self,
        source: &S,
        url: &str,
        include_raw_entry: bool,
    ) -> Result<Vec<TagEntry>, FetchError>
    where
        S: FeedSource + ?Sized,
    {
        let xml = source.get_text(url, self.timeout).await?;
        let entries = atom::parse(&xml, include_raw_entry);
        if entries.is_empty() && self.empty_feed == EmptyFeedPolicy::Retry {
            return Err(FetchError::no_entries());
        }
        Ok(entries)
    }
}

/// Process-scoped total of HTTP attempts, for operational logging only.
#[derive(Debug, Default)]
pub struct AttemptCounter {
    enabled: AtomicBool,
    total: AtomicU64,
}

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from zero.
    pub fn track(&self) {
        self.total.store(0, Ordering::SeqCst);
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.total.store(0, Ordering::SeqCst);
    }

    pub fn is_tracking(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn record(&self, attempts: u32) {
        if self.is_tracking() {
            self.total.fetch_add(u64::from(attempts), Ordering::SeqCst);
        }
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn log_total(&self) {
        let count = self.total();
        if count > 0 {
            info!(name = "total_requests", count, "total_requests");
        }
    }
}
