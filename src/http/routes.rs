use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::{Method, Uri};

use crate::{
    error::RestError,
    http::server::{serve_news, AppState},
};

pub const NEWS_PATH: &str = "/api/tarkov-news";

/// Catch-all router for hosting the handler on its own. Anything but
/// GET/HEAD on the news path is rejected here.
pub fn standalone(state: AppState) -> Router {
    Router::new().fallback(standalone_news).with_state(state)
}

/// Router for hosting behind a proxy that only forwards the news path.
pub fn route_scoped(state: AppState) -> Router {
    Router::new()
        .route(NEWS_PATH, get(news))
        .with_state(state)
}

async fn standalone_news(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if uri.path() != NEWS_PATH {
        return RestError::NotFound.into_response();
    }

    if method != Method::GET && method != Method::HEAD {
        return RestError::MethodNotAllowed.into_response();
    }

    serve_news(&state, &uri).await.into_response()
}

async fn news(State(state): State<AppState>, uri: Uri) -> Response {
    serve_news(&state, &uri).await.into_response()
}
