use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::{
    config::NewsConfig,
    feed::{self, normalize::to_iso, FeedResponse},
    request::FeedRequest,
    upstream::{build_upstream_url, FeedSource, UpstreamError},
};

/// Fetch, parse and normalize one feed request. Knows nothing about HTTP
/// routing or caching, so both hosting adapters share it.
#[derive(Clone)]
pub struct NewsPipeline {
    source: Arc<dyn FeedSource>,
    config: Arc<NewsConfig>,
}

impl NewsPipeline {
    pub fn new(source: Arc<dyn FeedSource>, config: Arc<NewsConfig>) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    pub fn normalize(&self, raw_query: Option<&str>) -> FeedRequest {
        FeedRequest::from_query_with_default(raw_query, &self.config.default_query)
    }

    pub async fn fetch_news(&self, request: &FeedRequest) -> Result<FeedResponse, UpstreamError> {
        let url = build_upstream_url(&self.config.upstream_url, request)?;
        let markup = self.source.fetch(&url).await?;

        let items = feed::parse_items(&markup, request.limit);
        info!(
            "serving {} items (lang: {:?}, window: {}h)",
            items.len(),
            request.language,
            request.window_hours
        );

        Ok(FeedResponse {
            ok: true,
            source: self.config.source_label.clone(),
            query: request.query.clone(),
            window_hours: request.window_hours,
            generated_at: to_iso(Utc::now()),
            items,
        })
    }
}
