//! Feed Client: the reqwest-backed [`FeedSource`].
//!
//! One long-lived `reqwest::Client` is built on first use and shared by every request
//! afterwards, so keep-alive connections are reused across calls and iterations.
//! [`FeedClient::close`] drops it so the process can shut down without dangling sockets;
//! the next request after a close simply builds a fresh pool.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, info};

use crate::contract::FeedSource;
use crate::error::{classify_status, classify_transport, FetchError};

const USER_AGENT: &str = concat!("tagwatch/", env!("CARGO_PKG_VERSION"));

pub struct FeedClient {
    keep_alive: Duration,
    pool: Mutex<Option<Client>>,
}

impl FeedClient {
    pub fn new(keep_alive: Duration) -> Self {
        Self {
            keep_alive,
            pool: Mutex::new(None),
        }
    }

    /// Returns the shared client, building it on first use.
    fn client(&self) -> Result<Client, FetchError> {
        let mut pool = self
            .pool
            .lock()
            .map_err(|_| FetchError::unknown("connection pool lock poisoned"))?;
        if let Some(client) = pool.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .tcp_keepalive(self.keep_alive)
            .build()
            .map_err(|e| FetchError::unknown(format!("client build: {e}")))?;
        debug!(keep_alive_ms = self.keep_alive.as_millis() as u64, "Opened connection pool");
        *pool = Some(client.clone());
        Ok(client)
    }

    /// Drops the shared connection pool. Safe to call repeatedly, or before any request.
    pub fn close(&self) {
        let Ok(mut pool) = self.pool.lock() else {
            return;
        };
        if pool.take().is_some() {
            info!("Closed connection pool");
        }
    }

    pub fn is_open(&self) -> bool {
        self.pool.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, FetchError> {
        let response = request.send().await.map_err(|e| FetchError::from(classify_transport(&e)))?;
        match classify_status(response.status().as_u16()) {
            None => Ok(response),
            Some(kind) => Err(kind.into()),
        }
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let client = self.client()?;
        let response = self.send(client.get(url).timeout(timeout)).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from(classify_transport(&e)))
    }

    async fn get_json(
        &self,
        url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, FetchError> {
        let client = self.client()?;
        let request = client
            .get(url)
            .header(AUTHORIZATION, format!("token {token}"))
            .timeout(timeout);
        let response = self.send(request).await?;
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::from(classify_transport(&e)))
    }
}
