//! Bearer-token extractor and standalone verifier.
//!
//! The trigger credential is stored only as an argon2 PHC string; callers
//! present the plaintext token as `Authorization: Bearer <token>`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::{AppState, error::Error};

/// Environment variable that carries the trigger credential hash.
pub const TOKEN_HASH_VAR: &str = "SITEWATCH_TRIGGER_TOKEN_HASH";

/// Credential accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub token_hash: String,
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

/// Verify the bearer token in `headers` against `config`.
///
/// A missing configuration is a server fault, reported before the request's
/// own credentials are looked at.
pub fn verify_bearer(headers: &HeaderMap, config: Option<&AuthConfig>) -> Result<(), Error> {
  let config = config.ok_or_else(|| Error::Config(format!("{TOKEN_HASH_VAR} is not set")))?;

  let parsed_hash = PasswordHash::new(&config.token_hash)
    .map_err(|e| Error::Config(format!("{TOKEN_HASH_VAR} is not a valid argon2 hash: {e}")))?;

  let token = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.trim().split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
    .map(|(_, token)| token.trim())
    .filter(|t| !t.is_empty())
    .ok_or(Error::Unauthorized)?;

  Argon2::default()
    .verify_password(token.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(())
}

impl<S, P> FromRequestParts<AppState<S, P>> for Authenticated
where
  S: Send + Sync,
  P: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, state.auth.as_deref())?;
    Ok(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Request, header};

  use crate::tests::{hash, state_with};

  async fn extract(req: Request<axum::body::Body>, token_hash: Option<String>) -> Result<Authenticated, Error> {
    let state = state_with(token_hash).await;
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, &state).await
  }

  fn bearer(token: &str) -> String { format!("Bearer {token}") }

  #[tokio::test]
  async fn correct_token() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, bearer("s3cret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(extract(req, Some(hash("s3cret"))).await.is_ok());
  }

  #[tokio::test]
  async fn scheme_is_case_insensitive() {
    for scheme in ["bearer", "BEARER", "BeArEr"] {
      let req = Request::builder()
        .header(header::AUTHORIZATION, format!("{scheme} s3cret"))
        .body(axum::body::Body::empty()).unwrap();
      assert!(extract(req, Some(hash("s3cret"))).await.is_ok(), "scheme {scheme}");
    }
  }

  #[tokio::test]
  async fn wrong_token() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, bearer("guess"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, Some(hash("s3cret"))).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, Some(hash("s3cret"))).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn basic_scheme_is_rejected() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic dXNlcjpzM2NyZXQ=")
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, Some(hash("s3cret"))).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unconfigured_credential_is_a_config_error() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, bearer("s3cret"))
      .body(axum::body::Body::empty()).unwrap();
    match extract(req, None).await {
      Err(Error::Config(msg)) => assert!(msg.contains(TOKEN_HASH_VAR), "{msg}"),
      _ => panic!("expected a configuration error"),
    }
  }

  #[tokio::test]
  async fn malformed_hash_is_a_config_error() {
    let req = Request::builder()
      .header(header::AUTHORIZATION, bearer("s3cret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, Some("plaintext".into())).await, Err(Error::Config(_))));
  }
}
