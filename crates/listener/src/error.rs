//! Listener error types.
//!
//! [`ListenerError`] covers starting and running the server. [`ApiError`] is
//! what a route answers with when a request fails; every failure reaches the
//! client as a JSON body, including rejections raised before a handler runs.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fulfillment::FulfillmentError;
use serde::Serialize;
use thiserror::Error;

/// The server could not start or stopped with an I/O error.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Error response of every route.
///
/// Serialises as `{ "error": "<summary>", "details": "<cause>" }`; `details`
/// is omitted when there is nothing beyond the summary.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn internal(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error).with_details(details)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Maps a handler error. `context` becomes the summary of upstream
    /// failures, with the adapter's message as `details`; validation and
    /// not-found messages are returned as-is.
    pub fn from_handler(err: FulfillmentError, context: &str) -> Self {
        match err {
            FulfillmentError::Validation { message } => Self::bad_request(message),
            FulfillmentError::NotFound { message } => Self::new(StatusCode::NOT_FOUND, message),
            FulfillmentError::Upstream { message } => Self::internal(context, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
