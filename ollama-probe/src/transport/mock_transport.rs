use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;

use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse};
use crate::{Error, Result};

/// A mock implementation of the [`Transport`] trait for testing purposes.
///
/// Responses are configured per request path. A path can either answer with a
/// canned [`HttpResponse`] or fail as if the server were unreachable. Every
/// request is recorded so tests can check which endpoints were hit and with
/// what payload.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<String, MockRoute>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

#[derive(Clone)]
enum MockRoute {
    Respond(HttpResponse),
    Fail(String),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Creates a new, empty [`MockTransport`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every request to `path` with `response`.
    pub fn with_response(self, path: impl Into<String>, response: HttpResponse) -> Self {
        lock(&self.routes).insert(path.into(), MockRoute::Respond(response));
        self
    }

    /// Shorthand for a response with the given status and body.
    pub fn with_status(self, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let body: String = body.into();
        self.with_response(path, HttpResponse::new(status).with_body(body))
    }

    /// Fails every request to `path` with [`Error::Connection`].
    pub fn with_connection_error(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        lock(&self.routes).insert(path.into(), MockRoute::Fail(message.into()));
        self
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Paths of all requests received so far, oldest first.
    pub fn requested_paths(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    /// Mocks sending an HTTP request.
    ///
    /// Paths without a configured route are treated as refused connections.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(path = %request.url)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let route = lock(&self.routes).get(&request.url).cloned();
        let path = request.url.clone();
        lock(&self.requests).push(request);

        match route {
            Some(MockRoute::Respond(response)) => Ok(response),
            Some(MockRoute::Fail(message)) => Err(Error::Connection(message)),
            None => Err(Error::Connection(format!("no mock route for {}", path))),
        }
    }
}
