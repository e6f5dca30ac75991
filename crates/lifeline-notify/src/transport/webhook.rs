//! Plain JSON webhooks (`http://`, `https://`, `generic://`).

use async_trait::async_trait;
use lifeline_common::LifelineResult;
use reqwest::{Client, Url};
use serde_json::json;

use super::{Transport, check_response, http_endpoint};

/// POSTs `{"message": "..."}` to the target.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: Client,
}

impl WebhookTransport {
    /// Create a webhook transport.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Endpoint a target posts to.
    ///
    /// `http(s)` targets are used as-is; `generic://host/path` becomes
    /// `https://host/path`.
    ///
    /// # Errors
    ///
    /// Returns an error if a generic target has no host.
    pub fn endpoint(target: &Url) -> LifelineResult<Url> {
        match target.scheme() {
            "http" | "https" => Ok(target.clone()),
            _ => http_endpoint(target),
        }
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, target: &Url, message: &str) -> LifelineResult<()> {
        let endpoint = Self::endpoint(target)?;
        tracing::debug!(host = endpoint.host_str().unwrap_or_default(), "Posting webhook");

        let result = self
            .client
            .post(endpoint)
            .json(&json!({ "message": message }))
            .send()
            .await;

        check_response(self.name(), result).await
    }
}
