//! OPTIONS handler: no auth required.
//!
//! Browser preflights carrying `Access-Control-Request-Method` are answered by
//! the CORS layer before reaching this; anything else lands here.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};

pub async fn handler() -> Response {
  (
    StatusCode::OK,
    [(header::ALLOW, HeaderValue::from_static("OPTIONS, POST"))],
  )
    .into_response()
}
