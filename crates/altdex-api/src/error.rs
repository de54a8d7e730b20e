//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use altdex_core::Error as CoreError;

/// A core error crossing the HTTP boundary.
///
/// Bodies are `{"error": "...", "code": "..."}`; the `code` field is stable
/// and machine-readable, the message is not.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code) = match &self.0 {
      CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
      CoreError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
      CoreError::CapacityFull { .. } => (StatusCode::CONFLICT, "sponsor_capacity_full"),
      CoreError::Duplicate { .. } => (StatusCode::CONFLICT, "duplicate"),
      CoreError::Payment(_) => (StatusCode::BAD_GATEWAY, "payment_gateway"),
      CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
      CoreError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
    };
    (
      status,
      Json(json!({ "error": self.0.to_string(), "code": code })),
    )
      .into_response()
  }
}
