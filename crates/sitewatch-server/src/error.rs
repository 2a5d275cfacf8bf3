//! Error types and axum `IntoResponse` implementation.
//!
//! Failures are reported to callers as a single plain-text message.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use sitewatch_probe::CycleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  /// Required configuration is missing; nothing was attempted.
  #[error("configuration error: {0}")]
  Config(String),
  #[error(transparent)]
  Cycle(#[from] CycleError),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"sitewatch\""),
        );
        res
      }
      Error::Config(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
      }
      Error::Cycle(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}
