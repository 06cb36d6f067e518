use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use reqwest::Url;

use crate::config::ProbeConfig;
use crate::transport::{ReqwestTransport, Transport};
use crate::{Error, OllamaClient, Result};

/// A builder for constructing an [`OllamaClient`].
///
/// - Uses either the configured base URL, the `OLLAMA_HOST` environment variable, or
///   `http://localhost:11434`.
/// - Uses either the configured API key, the `OLLAMA_API_KEY` environment variable, or nothing.
/// - Uses `reqwest`-based transport by default - [`ReqwestTransport`].
pub struct OllamaClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    transport: Option<Arc<dyn Transport + Send + Sync>>,
}

impl OllamaClientBuilder {
    /// Creates a new [`OllamaClientBuilder`]. This method is called by [`OllamaClient::builder`]
    pub(crate) fn new() -> Self {
        OllamaClientBuilder {
            base_url: None,
            api_key: None,
            transport: None,
        }
    }

    /// Sets the base URL for the Ollama API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the API key, sent as a bearer token.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Takes the base URL and API key from a [`ProbeConfig`].
    pub fn config(mut self, config: &ProbeConfig) -> Result<Self> {
        self.base_url = Some(config.base_url()?.to_string());
        self.api_key = config.api_key.clone();
        Ok(self)
    }

    /// Sets a custom transport implementation for the client.
    ///
    /// For testing, use [`MockTransport`](crate::transport::MockTransport). When a transport is
    /// set, the base URL and API key are ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the [`OllamaClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`](variant@Error::Client) if the base URL is invalid or if
    /// there's an issue initializing [`ReqwestTransport`].
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn build(self) -> Result<OllamaClient> {
        let transport = if let Some(t) = self.transport {
            t
        } else {
            let base_url = match self.base_url {
                Some(raw) => Url::parse(&raw)
                    .map_err(|e| Error::Client(format!("Invalid base URL: {}", e)))?,
                None => match std::env::var("OLLAMA_HOST") {
                    Ok(host) => ProbeConfig::default().with_ollama_host(&host)?.base_url()?,
                    Err(_) => ProbeConfig::default().base_url()?,
                },
            };
            let api_key = self
                .api_key
                .or_else(|| std::env::var("OLLAMA_API_KEY").ok());

            Arc::new(ReqwestTransport::new(base_url, api_key)?)
        };

        Ok(OllamaClient { transport })
    }
}
