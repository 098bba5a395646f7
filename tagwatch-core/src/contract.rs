//! # contract: collaborator interfaces for the tagwatch pipeline
//!
//! Everything the core talks to but does not own lives behind one of these traits:
//!
//! - [`FeedSource`]: one HTTP GET against an upstream feed, with status classification.
//!   [`crate::client::FeedClient`] is the production implementation.
//! - [`TagCache`]: best-known tag per repository, used for repositories over the fetch quota.
//! - [`TokenSource`]: the credentials rotated by the events monitor.
//! - [`MessagePublisher`]: the outbound message queue.
//!
//! ## Mocking & Testing
//! - Each trait is annotated for `mockall` (behind the default `test-export-mocks` feature)
//!   so dependents can build deterministic mocks for unit and integration tests.
//!
//! ## Errors
//! - Feed access returns the classified [`FetchError`].
//! - The other collaborators return boxed errors; the core only logs them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::FetchError;
use crate::events::ReleaseMessage;
use crate::fetch_tags::RepoGroup;

/// Error type for the non-feed collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One HTTP GET against an upstream feed.
///
/// Implementations classify the response with [`crate::error::classify_status`]:
/// callers rely on `BadRequest` meaning "stop now".
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch `url` and return the body as text.
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;

    /// Fetch `url` with `Authorization: token <token>` and decode the body as JSON.
    async fn get_json(
        &self,
        url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, FetchError>;
}

/// Read-only lookup of previously seen tags.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TagCache: Send + Sync {
    /// Return the best-known tag name per repository (`"owner/name"` → tag).
    ///
    /// Repositories with nothing cached are simply absent from the map.
    async fn lookup(&self, groups: &[RepoGroup]) -> Result<HashMap<String, String>, BoxError>;
}

/// Supplies the credentials the events monitor rotates through.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn load_access_tokens(&self) -> Result<Vec<String>, BoxError>;
}

/// Outbound message queue.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, message: &ReleaseMessage) -> Result<(), BoxError>;
}
