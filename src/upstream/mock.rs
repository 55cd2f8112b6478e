use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use url::Url;

use crate::upstream::{client::FeedSource, error::UpstreamError};

/// Canned feed source for offline runs and tests. Counts calls and remembers
/// the URLs it was asked for.
pub struct StaticFeedSource {
    outcome: Outcome,
    calls: AtomicUsize,
    requested: Mutex<Vec<Url>>,
}

enum Outcome {
    Body(String),
    Status(u16),
}

impl StaticFeedSource {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self::new(Outcome::Body(body.into()))
    }

    pub fn failing(status: u16) -> Self {
        Self::new(Outcome::Status(status))
    }

    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<Url> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self, url: &Url) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.requested.lock() {
            urls.push(url.clone());
        }

        match &self.outcome {
            Outcome::Body(body) => Ok(body.clone()),
            Outcome::Status(status) => Err(UpstreamError::Status(*status)),
        }
    }
}
