use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::dto::{
    FailureBody, RequestErrorBody, DECODE_FAILED_MESSAGE, FETCH_FAILED_MESSAGE,
};
use crate::domain::errors::DomainError;

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        match self {
            DomainError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(RequestErrorBody { error: message }),
            )
                .into_response(),
            DomainError::UpstreamFetch { body, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureBody::new(FETCH_FAILED_MESSAGE, Some(body))),
            )
                .into_response(),
            DomainError::ImageDecode(_) => (
                StatusCode::BAD_REQUEST,
                Json(FailureBody::new(DECODE_FAILED_MESSAGE, None)),
            )
                .into_response(),
            DomainError::Internal(e) => {
                let details = format!("{:?}", e);
                error!("💥 Internal error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FailureBody::new(e.to_string(), Some(details))),
                )
                    .into_response()
            }
        }
    }
}

/// Turns a handler panic into the same 500 body as any other internal error.
pub fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!("💥 Handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureBody::new(
            message.clone(),
            Some(format!("panic while handling request: {}", message)),
        )),
    )
        .into_response()
}
