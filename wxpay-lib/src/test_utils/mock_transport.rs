//! Recording transport with canned replies.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::{Result, WxPayError};

/// In-memory [`HttpTransport`].
///
/// Replies are served first in, first out. A call with no queued reply fails
/// with a transport error.
#[derive(Default)]
pub struct MockTransport {
    requests: RwLock<Vec<HttpRequest>>,
    replies: RwLock<VecDeque<Result<HttpResponse>>>,
    delay: RwLock<Option<Duration>>,
}

impl MockTransport {
    /// Create an empty transport.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a raw reply.
    pub fn push_response(&self, response: HttpResponse) {
        self.replies.write().unwrap().push_back(Ok(response));
    }

    /// Queue a 200 reply with a JSON body.
    pub fn push_json(&self, body: &str) {
        self.push_bytes(body.as_bytes().to_vec());
    }

    /// Queue a 200 reply with an XML body.
    pub fn push_xml(&self, body: &str) {
        self.push_bytes(body.as_bytes().to_vec());
    }

    /// Queue a 200 reply with an arbitrary body.
    pub fn push_bytes(&self, body: Vec<u8>) {
        self.push_response(HttpResponse { status: 200, body });
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: WxPayError) {
        self.replies.write().unwrap().push_back(Err(error));
    }

    /// Delay every reply by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap() = Some(delay);
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.write().unwrap().push(request);

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.replies
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WxPayError::Transport("no reply queued".to_string())))
    }
}
