use std::any::Any;

use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload produced by the host itself (unknown routes, panics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Answers every unmatched path, and known paths hit with an unsupported method.
pub async fn route_not_found(method: Method, uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    tracing::debug!(%method, path = %uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Route not found").with_message(format!(
            "Cannot {} {}",
            method,
            uri.path()
        ))),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Turn a handler panic into the generic 500 body. The panic text is only
/// echoed when `include_details` is set.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, include_details: bool) -> Response {
    let cause = panic_message(payload.as_ref());
    tracing::error!(cause = %cause, "Handler panicked");

    let mut body = ErrorResponse::new("Internal server error");
    if include_details {
        body = body.with_message(cause);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
