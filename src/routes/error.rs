use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use crate::utils::errors::{FetchError, QueryError, StoreError};
use crate::utils::extract_clean_error;

/// Error type for HTTP responses. Rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum HttpError {
    NotFound(String),
    Store(StoreError),
    Upstream(FetchError),
    UpstreamRateLimited(String),
    RateLimited(Duration),
    Internal(String),
}

impl From<QueryError> for HttpError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NotFound(msg) => Self::NotFound(msg),
            QueryError::Store(e) => Self::Store(e),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<FetchError> for HttpError {
    fn from(e: FetchError) -> Self {
        Self::Upstream(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Store(e) => {
                error!("Store error while serving request: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    extract_clean_error(&e.to_string()),
                )
            }
            Self::Upstream(e) => {
                warn!("Upstream error while serving request: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            Self::Internal(msg) => {
                error!("Internal error while serving request: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            Self::UpstreamRateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            Self::RateLimited(wait) => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Rate limit exceeded. Try again in {} seconds", wait.as_secs().max(1)),
            ),
        };

        let mut response = (status, axum::Json(json!({ "error": message }))).into_response();
        if let Self::RateLimited(wait) = self {
            if let Ok(value) = HeaderValue::from_str(&wait.as_secs().max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
