//! Test doubles for the HTTP transport port

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::transport::{HttpTransport, UpstreamError};

/// A request seen by `ScriptedTransport`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// One scripted outcome
#[derive(Debug)]
enum Scripted {
    Body(String),
    Status(u16),
    Network,
}

/// Transport replaying a fixed script of responses in order
///
/// Once the script runs out, every further call fails with a 500. Each call
/// yields to the scheduler first so concurrent callers interleave.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a 2xx response with this body
    pub fn ok(self, body: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Body(body.into()));
        self
    }

    /// Queues a failure with this HTTP status
    pub fn status(self, status: u16) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Status(status));
        self
    }

    /// Queues a failure with no status, like a refused connection
    pub fn network_error(self) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Network);
        self
    }

    /// Queues the same failure `times` times
    pub fn status_times(self, status: u16, times: usize) -> Self {
        (0..times).fold(self, |t, _| t.status(status))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, call: RecordedCall) -> Result<String, UpstreamError> {
        let url = call.url.clone();
        self.calls.lock().unwrap().push(call);
        match self.responses.lock().unwrap().pop_front() {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(status)) => Err(UpstreamError::from_status(url, status, "")),
            Some(Scripted::Network) => Err(UpstreamError::network(url, "connection refused")),
            None => Err(UpstreamError::from_status(url, 500, "script exhausted")),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<String, UpstreamError> {
        tokio::task::yield_now().await;
        self.respond(RecordedCall {
            method: "GET",
            url: url.to_string(),
            body: None,
        })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<String, UpstreamError> {
        tokio::task::yield_now().await;
        self.respond(RecordedCall {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::UpstreamErrorKind;

    #[tokio::test]
    async fn test_status_zero_is_not_a_network_error() {
        let transport = ScriptedTransport::new().status(0).network_error();

        let zero = transport.get("https://x.test/a").await.unwrap_err();
        let network = transport.get("https://x.test/b").await.unwrap_err();

        assert_eq!(zero.status, Some(0));
        assert_eq!(zero.kind, UpstreamErrorKind::ClientError);
        assert_eq!(network.status, None);
        assert_eq!(network.kind, UpstreamErrorKind::NetworkError);
    }
}
