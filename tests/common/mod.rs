//! Shared fakes for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pokefacade::data::{HttpTransport, UpstreamError};

/// Transport answering from a fixed table of URL -> status and body
///
/// Unknown URLs answer 404. Every request is counted per URL.
#[derive(Debug, Default)]
pub struct RoutedTransport {
    routes: HashMap<String, (u16, String)>,
    hits: Mutex<HashMap<String, usize>>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn answer(&self, url: &str) -> Result<String, UpstreamError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        match self.routes.get(url) {
            Some((status, body)) if (200..300).contains(status) => Ok(body.clone()),
            Some((status, body)) => Err(UpstreamError::from_status(url, *status, body)),
            None => Err(UpstreamError::from_status(url, 404, "")),
        }
    }
}

#[async_trait]
impl HttpTransport for RoutedTransport {
    async fn get(&self, url: &str) -> Result<String, UpstreamError> {
        self.answer(url)
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
    ) -> Result<String, UpstreamError> {
        self.answer(url)
    }
}
