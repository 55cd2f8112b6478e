use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::feed::FeedResponse;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

static BASIC_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), camera=(), microphone=(), payment=()",
    ),
];

static FRAMING_HEADERS: [(&str, &str); 2] = [
    ("x-frame-options", "DENY"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none';",
    ),
];

/// Which security headers API responses carry. `Strict` adds frame denial and
/// a CSP that forbids every resource load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderProfile {
    #[default]
    Strict,
    Basic,
}

impl HeaderProfile {
    pub fn headers(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        let framing: &[(&str, &str)] = match self {
            HeaderProfile::Strict => &FRAMING_HEADERS,
            HeaderProfile::Basic => &[],
        };
        BASIC_HEADERS.iter().chain(framing).copied()
    }

    /// Overwrites any stale values already present.
    pub fn apply(self, headers: &mut HeaderMap) {
        for (name, value) in self.headers() {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
    }
}

/// A fully buffered response. Cheap to clone, so the same value can be served
/// and handed to the cache.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => Bytes::from(body),
            Err(e) => {
                error!("failed to serialize response body: {}", e);
                return Self::json_error(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );

        Self {
            status,
            headers,
            body,
        }
    }

    fn json_error(status: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );

        Self {
            status,
            headers,
            body: Bytes::from_static(br#"{"ok":false,"error":"internal"}"#),
        }
    }

    pub fn text(status: StatusCode, message: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );

        Self {
            status,
            headers,
            body: Bytes::from_static(message.as_bytes()),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_security_headers(mut self, profile: HeaderProfile) -> Self {
        profile.apply(&mut self.headers);
        self
    }

    pub fn cache_control(&self) -> Option<&str> {
        self.headers
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// 200 with the feed payload and a public freshness window.
pub fn success(feed: &FeedResponse, max_age: u64) -> ApiResponse {
    let cache_control = HeaderValue::from_str(&format!("public, max-age={max_age}"))
        .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=900"));

    ApiResponse::json(StatusCode::OK, feed).with_header(header::CACHE_CONTROL, cache_control)
}

/// 502 reporting the upstream status, or `null` when none was received.
pub fn upstream_failure(status: Option<u16>) -> ApiResponse {
    ApiResponse::json(
        StatusCode::BAD_GATEWAY,
        &json!({
            "ok": false,
            "error": "upstream_failed",
            "status": status,
        }),
    )
}
