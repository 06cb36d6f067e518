use async_trait::async_trait;

use crate::types::{HttpRequest, HttpResponse};
use crate::Result;

mod mock_transport;
mod reqwest_transport;

pub use mock_transport::MockTransport;
pub use reqwest_transport::ReqwestTransport;

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a request and returns the response, whatever its status.
    ///
    /// Only failures to obtain a response at all (refused connection,
    /// timeout, unreadable body) are errors.
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse>;
}
