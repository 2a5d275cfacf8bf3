//! Error types for `sitewatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown error kind: {0:?}")]
  UnknownErrorKind(String),

  #[error("invalid site url {url:?}: {reason}")]
  InvalidUrl { url: String, reason: String },

  #[error("site name must not be empty")]
  EmptySiteName,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
