//! Site: a monitored URL owned by a user.
//!
//! Sites are owned by the registry. The probe engine treats every [`Site`] as
//! an immutable value for the duration of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

/// A registered website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
  pub site_id:    Uuid,
  pub owner_id:   Uuid,
  pub name:       String,
  pub url:        String,
  pub created_at: DateTime<Utc>,
}

/// Input for registering a site; `site_id` and `created_at` are assigned by
/// the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSite {
  pub owner_id: Uuid,
  pub name:     String,
  pub url:      String,
}

impl NewSite {
  pub fn new(owner_id: Uuid, name: impl Into<String>, url: impl Into<String>) -> Self {
    Self { owner_id, name: name.into(), url: url.into() }
  }

  /// Minimal upstream validation: a non-empty name and an absolute
  /// `http`/`https` URL. Anything stricter is left to the network layer.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptySiteName);
    }

    let parsed = Url::parse(self.url.trim()).map_err(|e| Error::InvalidUrl {
      url:    self.url.clone(),
      reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(Error::InvalidUrl {
        url:    self.url.clone(),
        reason: format!("unsupported scheme {:?}", parsed.scheme()),
      });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
      return Err(Error::InvalidUrl {
        url:    self.url.clone(),
        reason: "missing host".into(),
      });
    }

    Ok(())
  }
}
