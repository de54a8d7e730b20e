//! Error types and axum `IntoResponse` implementation for the server's own
//! routes (webhook and admin). API routes use [`altdex_api::ApiError`].

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid webhook signature")]
  BadSignature,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] altdex_core::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"altdex\""),
        );
        res
      }
      Error::BadSignature => {
        (StatusCode::UNAUTHORIZED, "invalid webhook signature")
          .into_response()
      }
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::Core(e) => altdex_api::ApiError(e).into_response(),
    }
  }
}
