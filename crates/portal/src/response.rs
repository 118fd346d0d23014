//! JSON envelope shared by every API response.
//!
//! Success: `{ "success": true, "data": ..., "message"?: ..., "count"?: ... }`
//! Failure: `{ "success": false, "error": "..." | ["...", ...] }`

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// Empty payload, serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

/// Successful API response.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: SuccessEnvelope<T>,
}

#[derive(Debug, Serialize)]
struct SuccessEnvelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            status,
            body: SuccessEnvelope {
                success: true,
                count: None,
                data,
                message: None,
            },
        }
    }

    /// `200 OK` with `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    /// `201 Created` with `data`.
    #[must_use]
    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// `200 OK` with a list and its length.
    #[must_use]
    pub fn list(items: Vec<T>) -> Self {
        let mut response = Self::ok(items);
        response.body.count = Some(response.body.data.len());
        response
    }
}

impl ApiResponse<Empty> {
    /// `200 OK` with empty data and a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(Empty {}).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Error body: one message, or every validation message.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    success: bool,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorDetail {
    One(String),
    Many(Vec<String>),
}

impl ErrorEnvelope {
    /// Envelope with a single message.
    #[must_use]
    pub fn one(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail::One(message.into()),
        }
    }

    /// Envelope with a list of messages.
    #[must_use]
    pub const fn many(messages: Vec<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail::Many(messages),
        }
    }
}

/// JSON body extractor whose rejection uses the error envelope.
///
/// Any body axum's `Json` would refuse (bad syntax, wrong shape, missing
/// content type) becomes a `400` with the rejection text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> AppError {
    tracing::debug!(error = %rejection, "Rejected request body");
    AppError::BadRequest(rejection.body_text())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use super::*;

    async fn render<T: Serialize>(response: ApiResponse<T>) -> (StatusCode, Value) {
        let response = response.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ok_envelope() {
        let (status, body) = render(ApiResponse::ok(json!({ "id": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": { "id": 1 } }));
    }

    #[tokio::test]
    async fn test_created_envelope() {
        let (status, _) = render(ApiResponse::created(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_list_envelope_has_count() {
        let (_, body) = render(ApiResponse::list(vec![1, 2, 3])).await;
        assert_eq!(body, json!({ "success": true, "count": 3, "data": [1, 2, 3] }));
    }

    #[tokio::test]
    async fn test_message_envelope_has_empty_data() {
        let (_, body) = render(ApiResponse::message("Customer deleted")).await;
        assert_eq!(
            body,
            json!({ "success": true, "data": {}, "message": "Customer deleted" })
        );
    }

    #[test]
    fn test_error_envelope_shapes() {
        assert_eq!(
            serde_json::to_value(ErrorEnvelope::one("nope")).unwrap(),
            json!({ "success": false, "error": "nope" })
        );
        assert_eq!(
            serde_json::to_value(ErrorEnvelope::many(vec!["a".into(), "b".into()])).unwrap(),
            json!({ "success": false, "error": ["a", "b"] })
        );
    }
}
