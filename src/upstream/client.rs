use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

use crate::{config::NewsConfig, upstream::error::UpstreamError};

/// Where raw feed bodies come from. One attempt per call, no retries.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, UpstreamError>;
}

pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(config: &NewsConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &Url) -> Result<String, UpstreamError> {
        debug!("fetching upstream feed: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("upstream feed returned {}", status);
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("got {} bytes of feed markup", body.len());
        Ok(body)
    }
}
