//! Probe outcomes and persisted automated-check records.
//!
//! A [`ProbeOutcome`] is transient: it lives from the moment a probe returns
//! until the snapshot writer folds it into an [`AutoCheckRecord`]. Records
//! are never appended to; each run replaces the whole set for every owner it
//! touches.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, site::Site};

// ─── Error taxonomy ──────────────────────────────────────────────────────────

/// The closed set of classifications a probe can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
  #[serde(rename = "timeout")]
  Timeout,
  #[serde(rename = "dns")]
  Dns,
  #[serde(rename = "403")]
  Forbidden,
  #[serde(rename = "500")]
  ServerError,
  #[serde(rename = "http")]
  Http,
  #[serde(rename = "ok")]
  Ok,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Timeout => "timeout",
      Self::Dns => "dns",
      Self::Forbidden => "403",
      Self::ServerError => "500",
      Self::Http => "http",
      Self::Ok => "ok",
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ErrorKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "timeout" => Ok(Self::Timeout),
      "dns" => Ok(Self::Dns),
      "403" => Ok(Self::Forbidden),
      "500" => Ok(Self::ServerError),
      "http" => Ok(Self::Http),
      "ok" => Ok(Self::Ok),
      other => Err(Error::UnknownErrorKind(other.to_owned())),
    }
  }
}

/// Structured failure reported by the network layer when no response was
/// received at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSignal {
  /// The request was aborted because its deadline elapsed.
  Timeout,
  /// The host name could not be resolved.
  Dns,
  /// A connection could not be established (refused, reset, TLS, ...).
  Connection,
  Other,
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The classified result of probing one site once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
  pub site:        Site,
  /// `None` when no response was received.
  pub status_code: Option<u16>,
  /// Milliseconds until response headers; `None` when no response arrived.
  pub elapsed_ms:  Option<u64>,
  pub is_live:     bool,
  pub error_kind:  ErrorKind,
}

// ─── Persisted record ────────────────────────────────────────────────────────

/// One row of an owner's automated-check snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCheckRecord {
  pub check_id:         Uuid,
  pub owner_id:         Uuid,
  pub site_id:          Uuid,
  pub site_name:        String,
  pub site_url:         String,
  pub status_code:      Option<u16>,
  pub error_kind:       ErrorKind,
  pub response_time_ms: Option<u64>,
  /// Shared by every record written in the same run.
  pub checked_at:       DateTime<Utc>,
  pub is_live:          bool,
}

impl AutoCheckRecord {
  /// Fold an outcome into a fresh record stamped with the run's timestamp.
  pub fn from_outcome(outcome: ProbeOutcome, checked_at: DateTime<Utc>) -> Self {
    let ProbeOutcome { site, status_code, elapsed_ms, is_live, error_kind } = outcome;
    Self {
      check_id: Uuid::new_v4(),
      owner_id: site.owner_id,
      site_id: site.site_id,
      site_name: site.name,
      site_url: site.url,
      status_code,
      error_kind,
      response_time_ms: elapsed_ms,
      checked_at,
      is_live,
    }
  }
}
