use std::error::Error;

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    http::response::{self, ApiResponse, HeaderProfile},
    upstream::UpstreamError,
};

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Error fetching the upstream news feed")]
    Upstream(#[from] UpstreamError),

    #[error("Not found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl RestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Upstream failures are API responses and carry the security headers;
    /// routing errors are plain text.
    pub fn into_api_response(self, profile: HeaderProfile) -> ApiResponse {
        let status = self.status();

        match self {
            RestError::Upstream(e) => {
                error!("upstream failed: {} ({:?})", e, e.source());
                response::upstream_failure(e.status()).with_security_headers(profile)
            }
            RestError::NotFound => ApiResponse::text(status, "Not found"),
            RestError::MethodNotAllowed => {
                debug!("rejected method");
                ApiResponse::text(status, "Method Not Allowed")
            }
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        self.into_api_response(HeaderProfile::default())
            .into_response()
    }
}
