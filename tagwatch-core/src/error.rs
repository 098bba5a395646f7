//! Fetch error taxonomy.
//!
//! Every upstream failure is folded into one of four kinds so callers can decide
//! whether to spend another attempt:
//!
//! - [`FetchErrorKind::BadRequest`]: upstream 4xx. Permanent, never retried.
//! - [`FetchErrorKind::BadResponse`]: any other non-200 status, including 429. Transient.
//! - [`FetchErrorKind::Unknown`]: timeouts, transport and decode failures. Transient.
//! - [`FetchErrorKind::NoEntries`]: the feed answered but carried nothing, when the
//!   caller asked for that to count as a failure.

use std::fmt;
use thiserror::Error;

/// The classified reason a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    #[error("unknown: {0}")]
    Unknown(String),

    #[error("bad request {0}")]
    BadRequest(u16),

    #[error("bad response {0}")]
    BadResponse(u16),

    #[error("no entries")]
    NoEntries,
}

impl FetchErrorKind {
    /// Returns true if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchErrorKind::BadRequest(_))
    }

    /// The upstream HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchErrorKind::BadRequest(s) | FetchErrorKind::BadResponse(s) => Some(*s),
            _ => None,
        }
    }
}

/// A fetch failure, optionally tagged with the repository it belongs to.
///
/// `repo` stays `None` until the error reaches [`crate::error_report::FetchErrors`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FetchError {
    #[source]
    pub kind: FetchErrorKind,
    pub repo: Option<String>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repo {
            Some(repo) => write!(f, "{} ({})", self.kind, repo),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl From<FetchErrorKind> for FetchError {
    fn from(kind: FetchErrorKind) -> Self {
        Self { kind, repo: None }
    }
}

impl FetchError {
    pub fn unknown(detail: impl Into<String>) -> Self {
        FetchErrorKind::Unknown(detail.into()).into()
    }

    pub fn bad_request(status: u16) -> Self {
        FetchErrorKind::BadRequest(status).into()
    }

    pub fn bad_response(status: u16) -> Self {
        FetchErrorKind::BadResponse(status).into()
    }

    pub fn no_entries() -> Self {
        FetchErrorKind::NoEntries.into()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn status(&self) -> Option<u16> {
        self.kind.status()
    }
}

/// Classifies an upstream HTTP status.
///
/// Returns `None` for 200. A 429 is a rate limit and counts as transient even though
/// it sits in the 4xx range.
pub fn classify_status(status: u16) -> Option<FetchErrorKind> {
    match status {
        200 => None,
        429 => Some(FetchErrorKind::BadResponse(status)),
        400..=499 => Some(FetchErrorKind::BadRequest(status)),
        _ => Some(FetchErrorKind::BadResponse(status)),
    }
}

/// Classifies a transport-level failure (no status was received).
pub fn classify_transport(err: &reqwest::Error) -> FetchErrorKind {
    if err.is_timeout() {
        FetchErrorKind::Unknown("timeout".to_string())
    } else if err.is_decode() {
        FetchErrorKind::Unknown(format!("decode: {err}"))
    } else {
        FetchErrorKind::Unknown(err.to_string())
    }
}
