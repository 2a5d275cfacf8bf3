//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, and integer measurements as SQLite integers.

use chrono::{DateTime, Utc};
use sitewatch_core::{
  check::{AutoCheckRecord, ErrorKind},
  site::Site,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Measurements ────────────────────────────────────────────────────────────

pub fn decode_status(raw: Option<i64>) -> Result<Option<u16>> {
  raw
    .map(|v| {
      u16::try_from(v).map_err(|_| Error::Corrupt {
        column: "status_code",
        value:  v.to_string(),
      })
    })
    .transpose()
}

pub fn encode_ms(ms: u64) -> i64 { i64::try_from(ms).unwrap_or(i64::MAX) }

pub fn decode_ms(raw: Option<i64>) -> Result<Option<u64>> {
  raw
    .map(|v| {
      u64::try_from(v).map_err(|_| Error::Corrupt {
        column: "response_time_ms",
        value:  v.to_string(),
      })
    })
    .transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `sites` row.
pub struct RawSite {
  pub site_id:    String,
  pub owner_id:   String,
  pub name:       String,
  pub url:        String,
  pub created_at: String,
}

impl RawSite {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      site_id:    row.get(0)?,
      owner_id:   row.get(1)?,
      name:       row.get(2)?,
      url:        row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_site(self) -> Result<Site> {
    Ok(Site {
      site_id:    decode_uuid(&self.site_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      name:       self.name,
      url:        self.url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column values of one `auto_checks` row, in either direction.
pub struct RawCheck {
  pub check_id:         String,
  pub owner_id:         String,
  pub site_id:          String,
  pub site_name:        String,
  pub site_url:         String,
  pub status_code:      Option<i64>,
  pub error_kind:       String,
  pub response_time_ms: Option<i64>,
  pub checked_at:       String,
  pub is_live:          bool,
}

impl RawCheck {
  pub fn from_record(record: AutoCheckRecord) -> Self {
    Self {
      check_id:         encode_uuid(record.check_id),
      owner_id:         encode_uuid(record.owner_id),
      site_id:          encode_uuid(record.site_id),
      site_name:        record.site_name,
      site_url:         record.site_url,
      status_code:      record.status_code.map(i64::from),
      error_kind:       record.error_kind.as_str().to_owned(),
      response_time_ms: record.response_time_ms.map(encode_ms),
      checked_at:       encode_dt(record.checked_at),
      is_live:          record.is_live,
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      check_id:         row.get(0)?,
      owner_id:         row.get(1)?,
      site_id:          row.get(2)?,
      site_name:        row.get(3)?,
      site_url:         row.get(4)?,
      status_code:      row.get(5)?,
      error_kind:       row.get(6)?,
      response_time_ms: row.get(7)?,
      checked_at:       row.get(8)?,
      is_live:          row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<AutoCheckRecord> {
    Ok(AutoCheckRecord {
      check_id:         decode_uuid(&self.check_id)?,
      owner_id:         decode_uuid(&self.owner_id)?,
      site_id:          decode_uuid(&self.site_id)?,
      site_name:        self.site_name,
      site_url:         self.site_url,
      status_code:      decode_status(self.status_code)?,
      error_kind:       self.error_kind.parse::<ErrorKind>()?,
      response_time_ms: decode_ms(self.response_time_ms)?,
      checked_at:       decode_dt(&self.checked_at)?,
      is_live:          self.is_live,
    })
  }
}
