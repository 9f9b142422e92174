//! Uniform JSON response envelope
//!
//! Every JSON endpoint replies with `{status, message, data}`, where the body
//! `status` mirrors the HTTP status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// The wire envelope for JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

fn envelope<T: Serialize>(code: StatusCode, message: &str, data: T) -> Response {
    (
        code,
        Json(ApiResponse {
            status: code.as_u16(),
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}

/// 200 with the standard "Success" message.
pub fn ok<T: Serialize>(data: T) -> Response {
    envelope(StatusCode::OK, "Success", data)
}

/// 400 with a caller-supplied message and payload.
pub fn bad_request<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::BAD_REQUEST, message, data)
}

/// 401 with a caller-supplied message and a null payload.
pub fn unauthorized(message: &str) -> Response {
    envelope(StatusCode::UNAUTHORIZED, message, serde_json::Value::Null)
}
