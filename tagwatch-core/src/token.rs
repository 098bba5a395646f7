//! Time-sliced credential rotation.
//!
//! The upstream rate limit resets every `cycle` seconds. Splitting the cycle into
//! `cycle / interval` slots and giving each slot the token at `slot % tokens` spreads the
//! requests evenly across credentials without any stored cursor: the choice depends only
//! on the clock.

use thiserror::Error;
use tracing::info;

use crate::contract::{BoxError, TokenSource};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no access tokens configured")]
    NoTokens,

    #[error("failed to load access tokens: {0}")]
    Load(#[source] BoxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRotation {
    tokens: Vec<String>,
}

impl TokenRotation {
    pub fn new(tokens: Vec<String>) -> Result<Self, TokenError> {
        if tokens.is_empty() {
            return Err(TokenError::NoTokens);
        }
        Ok(Self { tokens })
    }

    pub async fn load<T>(source: &T) -> Result<Self, TokenError>
    where
        T: TokenSource + ?Sized,
    {
        let tokens = source.load_access_tokens().await.map_err(TokenError::Load)?;
        info!(count = tokens.len(), "Loaded access tokens");
        Self::new(tokens)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn index_at(&self, now_ms: u64, cycle_secs: u64, interval_secs: u64) -> usize {
        token_index(now_ms, cycle_secs, interval_secs, self.tokens.len())
    }

    /// The token for the slot containing `now_ms`, with its index.
    pub fn pick(&self, now_ms: u64, cycle_secs: u64, interval_secs: u64) -> (usize, &str) {
        let index = self.index_at(now_ms, cycle_secs, interval_secs);
        (index, &self.tokens[index])
    }
}

/// `floor(now / 1000) mod (cycle / interval) mod token_count`.
///
/// The slot count is clamped to at least one. `token_count` must be non-zero;
/// [`TokenRotation`] guarantees that.
pub fn token_index(now_ms: u64, cycle_secs: u64, interval_secs: u64, token_count: usize) -> usize {
    let slots = (cycle_secs / interval_secs.max(1)).max(1);
    let slot = (now_ms / 1000) % slots;
    (slot % token_count as u64) as usize
}
