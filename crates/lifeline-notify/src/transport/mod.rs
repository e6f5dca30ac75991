//! Notification transports and the scheme registry.

mod chat;
mod ntfy;
mod webhook;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lifeline_common::{LifelineError, LifelineResult};
use reqwest::{Client, Url};

pub use chat::{DiscordTransport, SlackTransport, TelegramTransport};
pub use ntfy::NtfyTransport;
pub use webhook::WebhookTransport;

/// Timeout applied to every outbound notification request.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends a message to one target. One attempt, no retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Deliver `message` to `target`.
    async fn send(&self, target: &Url, message: &str) -> LifelineResult<()>;
}

/// Build the HTTP client shared by the built-in transports.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client() -> LifelineResult<Client> {
    Client::builder()
        .timeout(SEND_TIMEOUT)
        .user_agent(concat!("lifeline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LifelineError::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })
}

/// Maps URL schemes to transports.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl TransportRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in transport.
    #[must_use]
    pub fn with_defaults(client: Client) -> Self {
        let webhook: Arc<dyn Transport> = Arc::new(WebhookTransport::new(client.clone()));

        Self::new()
            .with("http", Arc::clone(&webhook))
            .with("https", Arc::clone(&webhook))
            .with("generic", webhook)
            .with("slack", Arc::new(SlackTransport::new(client.clone())))
            .with("discord", Arc::new(DiscordTransport::new(client.clone())))
            .with("telegram", Arc::new(TelegramTransport::new(client.clone())))
            .with("ntfy", Arc::new(NtfyTransport::new(client)))
    }

    /// Register a transport for a scheme, replacing any previous one.
    pub fn register(&mut self, scheme: impl Into<String>, transport: Arc<dyn Transport>) {
        self.transports
            .insert(scheme.into().to_ascii_lowercase(), transport);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, scheme: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        self.register(scheme, transport);
        self
    }

    /// Registered schemes, sorted.
    #[must_use]
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.transports.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parse a target and find the transport for its scheme.
    ///
    /// # Errors
    ///
    /// [`LifelineError::InvalidTarget`] if the target is not a URL,
    /// [`LifelineError::UnsupportedTransport`] if no transport handles its scheme.
    pub fn resolve(&self, target: &str) -> LifelineResult<(Arc<dyn Transport>, Url)> {
        let url = Url::parse(target.trim()).map_err(|e| LifelineError::InvalidTarget {
            target: target.to_string(),
            reason: e.to_string(),
        })?;

        let transport = self
            .transports
            .get(url.scheme())
            .cloned()
            .ok_or_else(|| LifelineError::UnsupportedTransport {
                scheme: url.scheme().to_string(),
            })?;

        Ok((transport, url))
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

fn invalid(target: &Url, reason: impl Into<String>) -> LifelineError {
    LifelineError::InvalidTarget {
        target: target.to_string(),
        reason: reason.into(),
    }
}

/// `?disabletls=yes` switches the derived endpoint to plain HTTP.
fn endpoint_scheme(target: &Url) -> &'static str {
    let disable_tls = target
        .query_pairs()
        .any(|(key, value)| key == "disabletls" && matches!(value.as_ref(), "yes" | "true" | "1"));

    if disable_tls { "http" } else { "https" }
}

/// Rebuild `scheme://host[:port]/path` as an HTTP(S) endpoint.
fn http_endpoint(target: &Url) -> LifelineResult<Url> {
    let host = target
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid(target, "missing host"))?;

    let mut endpoint = format!("{}://{host}", endpoint_scheme(target));
    if let Some(port) = target.port() {
        endpoint.push_str(&format!(":{port}"));
    }
    endpoint.push_str(target.path());

    Url::parse(&endpoint).map_err(|e| invalid(target, e.to_string()))
}

async fn check_response(
    transport: &'static str,
    result: reqwest::Result<reqwest::Response>,
) -> LifelineResult<()> {
    let response = result.map_err(|e| LifelineError::Send {
        transport: transport.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(LifelineError::Send {
        transport: transport.to_string(),
        message: format!("HTTP {status}: {}", body.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    #[async_trait]
    impl Transport for Nop {
        fn name(&self) -> &'static str {
            "nop"
        }

        async fn send(&self, _target: &Url, _message: &str) -> LifelineResult<()> {
            Ok(())
        }
    }

    #[test]
    fn default_schemes() {
        let registry = TransportRegistry::with_defaults(Client::new());
        assert_eq!(
            registry.schemes(),
            vec!["discord", "generic", "http", "https", "ntfy", "slack", "telegram"]
        );
    }

    #[test]
    fn resolve_by_scheme() {
        let registry = TransportRegistry::with_defaults(Client::new());

        let (transport, url) = registry.resolve("slack://A/B/C").unwrap();
        assert_eq!(transport.name(), "slack");
        assert_eq!(url.scheme(), "slack");

        let (transport, _) = registry.resolve("https://example.com/hook").unwrap();
        assert_eq!(transport.name(), "webhook");
    }

    #[test]
    fn resolve_errors() {
        let registry = TransportRegistry::with_defaults(Client::new());

        assert!(matches!(
            registry.resolve("not a url").err(),
            Some(LifelineError::InvalidTarget { .. })
        ));
        assert!(matches!(
            registry.resolve("pigeon://coop/1").err(),
            Some(LifelineError::UnsupportedTransport { scheme }) if scheme == "pigeon"
        ));
    }

    #[test]
    fn custom_transport_registration() {
        let registry = TransportRegistry::new().with("NOP", Arc::new(Nop));
        let (transport, _) = registry.resolve("nop://anything").unwrap();
        assert_eq!(transport.name(), "nop");
    }

    #[test]
    fn http_endpoint_honors_disabletls() {
        let target = Url::parse("generic://hooks.local:8443/notify?disabletls=yes").unwrap();
        assert_eq!(
            http_endpoint(&target).unwrap().as_str(),
            "http://hooks.local:8443/notify"
        );

        let target = Url::parse("generic://hooks.local/notify").unwrap();
        assert_eq!(
            http_endpoint(&target).unwrap().as_str(),
            "https://hooks.local/notify"
        );
    }
}
