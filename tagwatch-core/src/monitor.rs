//! Global Events Monitor.
//!
//! A single loop polls the global events feed once per interval:
//!
//! 1. pick the token for the current time slot ([`TokenRotation`]);
//! 2. fetch every page concurrently, a failed or malformed page counts as empty;
//! 3. merge, sort descending and dedup by id, keep releases and tag creations;
//! 4. drop ids already in the [`SeenEventWindow`];
//! 5. publish the rest without waiting on the queue, then remember their ids.
//!
//! Iteration start times are spaced one interval apart. An iteration that overruns is
//! followed immediately by the next one; missed slots are not made up.
//! A failing iteration is logged and the loop carries on.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::contract::{FeedSource, MessagePublisher};
use crate::events::{self, GlobalEvent, ReleaseMessage};
use crate::token::TokenRotation;
use crate::window::SeenEventWindow;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("system clock is before the unix epoch")]
    Clock(#[from] std::time::SystemTimeError),
}

/// What one iteration did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub token_index: usize,
    /// Distinct events across all accepted pages.
    pub fetched: usize,
    /// Release and tag events among them.
    pub matched: usize,
    /// Ids handed to the publisher, highest first.
    pub published: Vec<u64>,
}

pub struct EventsMonitor<S: ?Sized, P: ?Sized> {
    source: Arc<S>,
    publisher: Arc<P>,
    tokens: TokenRotation,
    config: MonitorConfig,
    window: SeenEventWindow,
    in_flight: JoinSet<()>,
}

impl<S, P> EventsMonitor<S, P>
where
    S: FeedSource + ?Sized,
    P: MessagePublisher + ?Sized + 'static,
{
    pub fn new(
        source: Arc<S>,
        publisher: Arc<P>,
        tokens: TokenRotation,
        config: MonitorConfig,
    ) -> Self {
        let window = SeenEventWindow::new(config.track_events_for_duplicates);
        Self {
            source,
            publisher,
            tokens,
            config,
            window,
            in_flight: JoinSet::new(),
        }
    }

    pub fn window(&self) -> &SeenEventWindow {
        &self.window
    }

    /// Runs iterations until `shutdown` resolves, then waits for pending publishes.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let interval = self.config.interval();
        info!(interval_secs = interval.as_secs(), "Events monitor started");

        loop {
            let started = Instant::now();
            match self.tick().await {
                Ok(report) => debug!(
                    token = report.token_index,
                    fetched = report.fetched,
                    matched = report.matched,
                    published = report.published.len(),
                    "Events poll complete"
                ),
                Err(e) => error!(error = %e, "Events poll failed"),
            }

            let delay = next_delay(started.elapsed(), interval);
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.flush().await;
        info!("Events monitor stopped");
    }

    /// One iteration at the current wall-clock time.
    pub async fn tick(&mut self) -> Result<PollReport, MonitorError> {
        let now_ms = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
        Ok(self.poll_once(now_ms).await)
    }

    /// One iteration as if the clock read `now_ms`.
    pub async fn poll_once(&mut self, now_ms: u64) -> PollReport {
        self.reap();

        let (token_index, token) =
            self.tokens
                .pick(now_ms, self.config.cycle_secs, self.config.interval_secs);
        let pages = self.fetch_pages(token).await;
        let merged = events::merge_pages(pages);
        let fetched = merged.len();
        let releases = events::filter_releases(merged);
        let matched = releases.len();

        let fresh: Vec<GlobalEvent> = releases
            .into_iter()
            .filter(|e| !self.window.contains(e.id))
            .collect();

        for event in &fresh {
            self.publish(ReleaseMessage::from(event));
        }
        let published: Vec<u64> = fresh.iter().map(|e| e.id).collect();
        self.window.extend(published.iter().copied());

        PollReport {
            token_index,
            fetched,
            matched,
            published,
        }
    }

    async fn fetch_pages(&self, token: &str) -> Vec<Vec<GlobalEvent>> {
        let timeout = self.config.timeout();
        let urls = self.config.page_urls();
        let requests = urls.iter().map(|url| async move {
            match self.source.get_json(url, token, timeout).await {
                Ok(body) => events::validate_page(body).unwrap_or_else(|| {
                    warn!(url = %url, "Events page is malformed, treating as empty");
                    Vec::new()
                }),
                Err(e) => {
                    warn!(url = %url, error = %e, "Events page fetch failed");
                    Vec::new()
                }
            }
        });
        join_all(requests).await
    }

    fn publish(&mut self, message: ReleaseMessage) {
        let publisher = Arc::clone(&self.publisher);
        self.in_flight.spawn(async move {
            if let Err(e) = publisher.publish(&message).await {
                error!(error = %e, id = message.id, repo = %message.repo_name, "Can't send message to queue");
            }
        });
    }

    fn reap(&mut self) {
        while let Some(joined) = self.in_flight.try_join_next() {
            if let Err(e) = joined {
                error!(error = %e, "Publish task panicked");
            }
        }
    }

    /// Waits for every publish spawned so far.
    pub async fn flush(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Publish task panicked");
            }
        }
    }
}

/// Delay before the next iteration so that starts stay `interval` apart.
pub fn next_delay(elapsed: Duration, interval: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
