//! ntfy topics (`ntfy://host/topic`).

use async_trait::async_trait;
use lifeline_common::LifelineResult;
use reqwest::{Client, Url};

use super::{Transport, check_response, http_endpoint, invalid};

/// Publishes the message as the plain-text body of a topic POST.
#[derive(Debug, Clone)]
pub struct NtfyTransport {
    client: Client,
}

impl NtfyTransport {
    /// Create an ntfy transport.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// `ntfy://ntfy.sh/deploys` → `https://ntfy.sh/deploys`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or topic is missing.
    pub fn endpoint(target: &Url) -> LifelineResult<Url> {
        if target.path().trim_matches('/').is_empty() {
            return Err(invalid(target, "missing topic"));
        }
        http_endpoint(target)
    }
}

#[async_trait]
impl Transport for NtfyTransport {
    fn name(&self) -> &'static str {
        "ntfy"
    }

    async fn send(&self, target: &Url, message: &str) -> LifelineResult<()> {
        let endpoint = Self::endpoint(target)?;

        let result = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(message.to_string())
            .send()
            .await;

        check_response(self.name(), result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_endpoint() {
        let url = Url::parse("ntfy://ntfy.sh/deploys").unwrap();
        assert_eq!(
            NtfyTransport::endpoint(&url).unwrap().as_str(),
            "https://ntfy.sh/deploys"
        );

        let url = Url::parse("ntfy://ntfy.sh").unwrap();
        assert!(NtfyTransport::endpoint(&url).is_err());
    }
}
