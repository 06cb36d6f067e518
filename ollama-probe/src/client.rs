use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::builder::OllamaClientBuilder;
use crate::types::chat::{ChatRequest, SimpleChatRequest};
use crate::types::{HttpRequest, HttpResponse};
use crate::OllamaClient;
use crate::Result;

impl OllamaClient {
    pub fn builder() -> OllamaClientBuilder {
        OllamaClientBuilder::new()
    }

    /// `GET /api/tags`. The response is returned whatever its status.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn list_models(&self, timeout: Duration) -> Result<HttpResponse> {
        #[cfg(feature = "metrics")]
        counter!("ollama_probe.requests_total", "probe" => "tags").increment(1);

        let request = HttpRequest::new("/api/tags").get().timeout(timeout);
        self.transport.send_http_request(request).await
    }

    /// `POST /api/chat` with `stream: false`. The response is returned whatever its status.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(model = %request.model)))]
    pub async fn chat_simple(
        &self,
        request: SimpleChatRequest,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        #[cfg(feature = "metrics")]
        counter!("ollama_probe.requests_total", "probe" => "chat").increment(1);

        let chat_request = ChatRequest::from(request);
        let request = HttpRequest::new("/api/chat")
            .post()
            .timeout(timeout)
            .body(chat_request)?;

        self.transport.send_http_request(request).await
    }
}
