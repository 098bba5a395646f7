//! HTTP message queue publisher.
//!
//! Each [`ReleaseMessage`] is POSTed as JSON to the configured queue endpoint. Any non-2xx
//! answer counts as a failed publish; the monitor logs it and moves on.

use async_trait::async_trait;
use std::time::Duration;
use tagwatch_core::contract::{BoxError, MessagePublisher};
use tagwatch_core::events::ReleaseMessage;

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpQueuePublisher {
    client: reqwest::Client,
    url: String,
}

impl HttpQueuePublisher {
    pub fn new(url: impl Into<String>) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .user_agent(concat!("tagwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let url = url.into();
        tracing::info!(queue_url = %url, "Initialized HttpQueuePublisher");
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessagePublisher for HttpQueuePublisher {
    async fn publish(&self, message: &ReleaseMessage) -> Result<(), BoxError> {
        let response = self.client.post(&self.url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                event_id = message.id,
                status = status.as_u16(),
                "Queue rejected message"
            );
            return Err(format!("queue responded with status {status}").into());
        }
        tracing::debug!(
            event_id = message.id,
            repo = %message.repo_name,
            tag = %message.tag_name,
            "Published release message"
        );
        Ok(())
    }
}
