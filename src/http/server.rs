use std::{future::Future, sync::Arc};

use axum::Router;
use clap::ValueEnum;
use http::Uri;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cache::CacheGateway,
    config::NewsConfig,
    error::RestError,
    http::{
        response::{self, ApiResponse, HeaderProfile},
        routes,
    },
    pipeline::NewsPipeline,
    upstream::{FeedSource, HttpFeedSource, UpstreamError},
};

/// How the handler is hosted. `Standalone` receives every path and routes
/// itself; `Route` is mounted on the news path only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Deployment {
    #[default]
    Standalone,
    Route,
}

#[derive(Clone)]
pub struct AppState {
    pipeline: NewsPipeline,
    cache: CacheGateway,
    profile: HeaderProfile,
}

impl AppState {
    pub fn new(config: NewsConfig, source: Arc<dyn FeedSource>) -> Self {
        let cache = CacheGateway::new(config.cache_capacity);
        let profile = config.header_profile;

        Self {
            pipeline: NewsPipeline::new(source, Arc::new(config)),
            cache,
            profile,
        }
    }

    /// State backed by the real upstream HTTP client.
    pub fn from_config(config: NewsConfig) -> Result<Self, UpstreamError> {
        let source = HttpFeedSource::new(&config)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub fn cache(&self) -> &CacheGateway {
        &self.cache
    }
}

/// The whole request path shared by both deployments: cache lookup, then on a
/// miss fetch, assemble and schedule the cache write.
pub async fn serve_news(state: &AppState, uri: &Uri) -> ApiResponse {
    let key = CacheGateway::key_for(uri);

    // Stored headers may predate a config change, so always reapply.
    if let Some(cached) = state.cache.lookup(&key).await {
        return cached.with_security_headers(state.profile);
    }

    let request = state.pipeline.normalize(uri.query());

    match state.pipeline.fetch_news(&request).await {
        Ok(feed) => {
            let max_age = state.pipeline.config().cache_max_age;
            let response = response::success(&feed, max_age).with_security_headers(state.profile);
            state.cache.store_deferred(key, response.clone());
            response
        }
        Err(e) => RestError::from(e).into_api_response(state.profile),
    }
}

pub struct HttpServer {
    state: AppState,
    deployment: Deployment,
}

impl HttpServer {
    pub fn new(state: AppState, deployment: Deployment) -> Self {
        Self { state, deployment }
    }

    pub fn router(&self) -> Router {
        let router = match self.deployment {
            Deployment::Standalone => routes::standalone(self.state.clone()),
            Deployment::Route => routes::route_scoped(self.state.clone()),
        };

        router.layer(TraceLayer::new_for_http())
    }

    /// Serves until `shutdown` resolves, then waits for deferred cache writes.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("server stopped, flushing cache writes");
        self.state.cache.drain().await;
        Ok(())
    }
}
