//! Response envelope and request extractors
//!
//! Successful bodies are `{"status": "success", ...payload}`; the payload's
//! fields are flattened next to `status`. Extractor rejections are turned
//! into [`AppError`] so malformed input renders the same error body as any
//! other failure.

use std::borrow::Cow;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::app_error::AppError;

/// Success envelope
///
/// ```rust
/// use kernel::response::{Message, Success};
/// let ok = Success::ok(Message::new("Logged out"));
/// ```
#[derive(Debug, Serialize)]
pub struct Success<T> {
    #[serde(skip)]
    code: StatusCode,
    status: &'static str,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Success<T> {
    /// 200 OK
    pub fn ok(payload: T) -> Self {
        Self {
            code: StatusCode::OK,
            status: "success",
            payload,
        }
    }

    /// 201 Created
    pub fn created(payload: T) -> Self {
        Self {
            code: StatusCode::CREATED,
            ..Self::ok(payload)
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

/// Payload carrying only a human-readable message
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: Cow<'static, str>,
}

impl Message {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Empty payload, renders as `{"status": "success"}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Empty {}

/// `axum::Json` with rejections rendered as [`AppError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with rejections rendered as [`AppError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` with rejections rendered as [`AppError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        user_id: i64,
    }

    #[tokio::test]
    async fn test_success_flattens_payload() {
        let response = Success::created(Payload { user_id: 3 }).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"status": "success", "userId": 3}));
    }

    #[tokio::test]
    async fn test_empty_payload() {
        let response = Success::ok(Empty {}).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"status": "success"}));
    }
}
