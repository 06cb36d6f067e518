#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse, HttpVerb};
use crate::{Error, Result};

/// A [`Transport`] implementation that uses the `reqwest` crate for making HTTP requests.
///
/// This is the default transport used by [`OllamaClient`](crate::OllamaClient) if no custom
/// transport is provided. Unlike a typical API client it does not turn error statuses into
/// errors: the probes need to see and report them.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Ollama server. A path prefix (e.g. `/ollama` behind a
    ///   reverse proxy) is kept: request paths are resolved underneath it.
    /// * `api_key` - An optional API key, sent as a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`] if the `reqwest` client cannot be built.
    pub fn new(mut base_url: Url, api_key: Option<String>) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    /// Sends a request using `reqwest` and buffers the full body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Transport`] if no response arrives within the request's timeout,
    /// the connection fails, or the body cannot be read.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(path = %request.url)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self
            .base_url
            .join(request.url.trim_start_matches('/'))
            .map_err(|e| Error::Client(e.to_string()))?;

        let mut request_builder = match request.verb {
            HttpVerb::GET => self.client.get(url),
            HttpVerb::POST => self.client.post(url),
        };

        if let Some(timeout) = request.timeout {
            request_builder = request_builder.timeout(timeout);
        }

        if let Some(api_key) = &self.api_key {
            request_builder = request_builder.bearer_auth(api_key);
        }

        if let Some(body) = &request.body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        #[cfg(feature = "tracing")]
        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse {
            status,
            body: Some(body),
        })
    }
}
