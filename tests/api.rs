use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode, Uri},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tarkov_news::{
    cache::CacheGateway,
    config::NewsConfig,
    http::{routes, server::serve_news, ApiResponse, AppState, HeaderProfile},
    upstream::mock::StaticFeedSource,
};

const NEWS: &str = include_str!("./fixtures/news.rss");

fn state_with(source: Arc<StaticFeedSource>) -> AppState {
    AppState::new(NewsConfig::default(), source)
}

async fn send(router: &Router, method: Method, uri: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The cache write happens after the response is returned.
async fn wait_for_store(cache: &CacheGateway, key: &str) {
    for _ in 0..100 {
        if cache.contains(key) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("response for {key} was never cached");
}

#[tokio::test]
async fn test_success_envelope_and_headers() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let router = routes::standalone(state_with(source));

    let response = send(&router, Method::GET, "/api/tarkov-news?lang=en&limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=900");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert_eq!(
        headers["permissions-policy"],
        "geolocation=(), camera=(), microphone=(), payment=()"
    );
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(
        headers["content-security-policy"],
        "default-src 'none'; frame-ancestors 'none';"
    );

    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["source"], "google-news-rss");
    assert_eq!(body["query"], r#""Escape from Tarkov" OR Tarkov OR Battlestate"#);
    assert_eq!(body["windowHours"], 72);
    assert!(body["generatedAt"].as_str().unwrap().ends_with('Z'));

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["publishedAt"], "2024-12-16T17:05:00.000Z");
    for key in ["title", "url", "source", "publishedAt", "excerpt"] {
        assert!(items[0].get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn test_upstream_failure_is_502_and_not_cached() {
    let source = Arc::new(StaticFeedSource::failing(503));
    let state = state_with(source.clone());
    let router = routes::standalone(state.clone());

    let response = send(&router, Method::GET, "/api/tarkov-news").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    assert_eq!(
        json_body(response).await,
        json!({"ok": false, "error": "upstream_failed", "status": 503})
    );

    let response = send(&router, Method::GET, "/api/tarkov-news").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(source.calls(), 2);
    assert!(!state.cache().contains("/api/tarkov-news"));
}

#[tokio::test]
async fn test_second_identical_request_is_served_from_cache() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let state = state_with(source.clone());
    let router = routes::standalone(state.clone());
    let uri = "/api/tarkov-news?lang=de&hours=24&limit=3";

    let first = send(&router, Method::GET, uri).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = json_body(first).await;

    wait_for_store(state.cache(), uri).await;

    let second = send(&router, Method::GET, uri).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-frame-options"], "DENY");
    assert_eq!(json_body(second).await, first);

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_cache_hit_gets_current_security_headers() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let state = state_with(source.clone());
    let uri: Uri = "/api/tarkov-news?lang=en".parse().unwrap();

    let stale = ApiResponse::text(StatusCode::OK, "stored earlier")
        .with_header(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=900"))
        .with_header(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("unsafe-url"),
        );
    assert!(state.cache().store(CacheGateway::key_for(&uri), stale).await);

    let response = serve_news(&state, &uri).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"stored earlier");
    assert_eq!(
        response.headers["referrer-policy"],
        "strict-origin-when-cross-origin"
    );
    assert_eq!(
        response.headers["content-security-policy"],
        "default-src 'none'; frame-ancestors 'none';"
    );
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_different_query_is_a_different_key() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let state = state_with(source.clone());
    let router = routes::standalone(state.clone());

    send(&router, Method::GET, "/api/tarkov-news?lang=de").await;
    wait_for_store(state.cache(), "/api/tarkov-news?lang=de").await;
    send(&router, Method::GET, "/api/tarkov-news?lang=en").await;

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_unsupported_language_uses_german_profile() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let router = routes::standalone(state_with(source.clone()));

    let response = send(&router, Method::GET, "/api/tarkov-news?lang=xx").await;
    assert_eq!(response.status(), StatusCode::OK);

    let url = source.requested_urls().pop().unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("hl".to_string(), "de".to_string())));
    assert!(pairs.contains(&("gl".to_string(), "DE".to_string())));
    assert!(pairs.contains(&("ceid".to_string(), "DE:de".to_string())));
}

#[tokio::test]
async fn test_out_of_range_params_are_clamped() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let router = routes::standalone(state_with(source.clone()));

    let response = send(&router, Method::GET, "/api/tarkov-news?hours=9000&limit=abc").await;
    let body = json_body(response).await;

    assert_eq!(body["windowHours"], 168);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let url = source.requested_urls().pop().unwrap();
    assert!(url.as_str().contains("when%3A168h"));
}

#[tokio::test]
async fn test_standalone_rejects_other_paths_and_methods() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let router = routes::standalone(state_with(source.clone()));

    let response = send(&router, Method::GET, "/api/other").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&router, Method::POST, "/api/tarkov-news").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Method Not Allowed");

    let response = send(&router, Method::HEAD, "/api/tarkov-news").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_route_scoped_variant_with_basic_headers() {
    let source = Arc::new(StaticFeedSource::with_body(NEWS));
    let config = NewsConfig::default().with_header_profile(HeaderProfile::Basic);
    let router = routes::route_scoped(AppState::new(config, source));

    let response = send(&router, Method::GET, "/api/tarkov-news?lang=en").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().get("content-security-policy").is_none());
    assert!(response.headers().get("x-frame-options").is_none());

    let response = send(&router, Method::POST, "/api/tarkov-news").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_empty_feed_is_ok_with_no_items() {
    let source = Arc::new(StaticFeedSource::with_body("<rss><channel></channel></rss>"));
    let router = routes::standalone(state_with(source));

    let response = send(&router, Method::GET, "/api/tarkov-news").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["items"], json!([]));
}
