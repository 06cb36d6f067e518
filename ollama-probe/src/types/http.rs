use std::time::Duration;

use crate::Result;
use bytes::Bytes;
use serde::Serialize;

#[derive(Default, Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub verb: HttpVerb,
    pub body: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    #[default]
    GET,
    POST,
}

/// A response as seen by the probes: the status code is always present, the
/// body only when the server sent one.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn get(mut self) -> Self {
        self.verb = HttpVerb::GET;
        self
    }

    pub fn post(mut self) -> Self {
        self.verb = HttpVerb::POST;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn body<T: Serialize>(mut self, body: T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Only `200 OK` counts as success for the probes.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// The raw body as text, lossily decoded. Empty when there is no body.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.bytes()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_of_missing_body_is_empty() {
        let response = HttpResponse::new(204);
        assert_eq!(response.text(), "");
        assert!(!response.is_ok());
    }

    #[test]
    fn request_builder_sets_verb_body_and_timeout() -> Result<()> {
        let request = HttpRequest::new("/api/chat")
            .post()
            .timeout(Duration::from_secs(30))
            .body(serde_json::json!({"stream": false}))?;

        assert_eq!(request.verb, HttpVerb::POST);
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
        assert_eq!(request.body, Some(serde_json::json!({"stream": false})));
        Ok(())
    }
}
