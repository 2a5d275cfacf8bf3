//! [`SqliteStore`], the SQLite implementation of [`SiteRegistry`] and
//! [`SnapshotStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sitewatch_core::{
  check::AutoCheckRecord,
  site::{NewSite, Site},
  store::{ReplaceError, SiteRegistry, SnapshotStore},
};

use crate::{
  encode::{RawCheck, RawSite, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

const SITE_COLUMNS: &str = "site_id, owner_id, name, url, created_at";

const CHECK_COLUMNS: &str = "check_id, owner_id, site_id, site_name, site_url, \
                             status_code, error_kind, response_time_ms, checked_at, is_live";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sitewatch store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────

/// Owners bound per `DELETE`; SQLite caps host parameters per statement.
pub(crate) const PURGE_CHUNK: usize = 500;

/// Run inside a transaction: a large owner set spans several statements.
fn purge_owners(conn: &rusqlite::Connection, owners: &[String]) -> rusqlite::Result<usize> {
  let mut deleted = 0;
  for chunk in owners.chunks(PURGE_CHUNK) {
    let placeholders = vec!["?"; chunk.len()].join(", ");
    let sql = format!("DELETE FROM auto_checks WHERE owner_id IN ({placeholders})");
    deleted += conn.execute(&sql, rusqlite::params_from_iter(chunk.iter()))?;
  }
  Ok(deleted)
}

fn insert_checks(conn: &rusqlite::Connection, rows: &[RawCheck]) -> rusqlite::Result<usize> {
  let mut stmt = conn.prepare_cached(&format!(
    "INSERT INTO auto_checks ({CHECK_COLUMNS})
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
  ))?;
  for row in rows {
    stmt.execute(rusqlite::params![
      row.check_id,
      row.owner_id,
      row.site_id,
      row.site_name,
      row.site_url,
      row.status_code,
      row.error_kind,
      row.response_time_ms,
      row.checked_at,
      row.is_live,
    ])?;
  }
  Ok(rows.len())
}

/// Which statement of a replacement failed inside the transaction.
enum Phase {
  Purge,
  Insert,
}

// ─── SiteRegistry impl ───────────────────────────────────────────────────────

impl SiteRegistry for SqliteStore {
  type Error = Error;

  async fn list_sites(&self, owner_id: Option<Uuid>) -> Result<Vec<Site>> {
    let owner_str = owner_id.map(encode_uuid);

    let raws: Vec<RawSite> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(owner) = owner_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SITE_COLUMNS} FROM sites WHERE owner_id = ?1 ORDER BY created_at, name"
          ))?;
          stmt
            .query_map(rusqlite::params![owner], RawSite::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SITE_COLUMNS} FROM sites ORDER BY created_at, name"
          ))?;
          stmt
            .query_map([], RawSite::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSite::into_site).collect()
  }

  async fn get_site(&self, site_id: Uuid) -> Result<Option<Site>> {
    let id_str = encode_uuid(site_id);

    let raw: Option<RawSite> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SITE_COLUMNS} FROM sites WHERE site_id = ?1"),
            rusqlite::params![id_str],
            RawSite::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSite::into_site).transpose()
  }

  async fn add_site(&self, input: NewSite) -> Result<Site> {
    input.validate()?;

    let site = Site {
      site_id:    Uuid::new_v4(),
      owner_id:   input.owner_id,
      name:       input.name.trim().to_owned(),
      url:        input.url.trim().to_owned(),
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(site.site_id);
    let owner_str = encode_uuid(site.owner_id);
    let name      = site.name.clone();
    let url       = site.url.clone();
    let at_str    = encode_dt(site.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO sites ({SITE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          rusqlite::params![id_str, owner_str, name, url, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(site)
  }

  async fn remove_site(&self, site_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(site_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM sites WHERE site_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteStore {
  type Error = Error;

  async fn purge_snapshots(&self, owner_ids: Vec<Uuid>) -> Result<usize> {
    let owners: Vec<String> = owner_ids.into_iter().map(encode_uuid).collect();
    if owners.is_empty() {
      return Ok(0);
    }

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = purge_owners(&tx, &owners)?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(deleted)
  }

  async fn insert_records(&self, records: Vec<AutoCheckRecord>) -> Result<usize> {
    let rows: Vec<RawCheck> = records.into_iter().map(RawCheck::from_record).collect();
    if rows.is_empty() {
      return Ok(0);
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = insert_checks(&tx, &rows)?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(inserted)
  }

  /// Purge and insert inside one transaction: if the insert fails the purge
  /// is rolled back and the owners keep their previous snapshot.
  async fn replace_snapshots(
    &self,
    owner_ids: Vec<Uuid>,
    records: Vec<AutoCheckRecord>,
  ) -> Result<usize, ReplaceError<Error>> {
    let owners: Vec<String> = owner_ids.into_iter().map(encode_uuid).collect();
    let rows: Vec<RawCheck> = records.into_iter().map(RawCheck::from_record).collect();
    if owners.is_empty() && rows.is_empty() {
      return Ok(0);
    }

    let result: std::result::Result<(usize, usize), (Phase, rusqlite::Error)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let deleted = match purge_owners(&tx, &owners) {
          Ok(n) => n,
          Err(e) => return Ok(Err((Phase::Purge, e))),
        };
        let inserted = match insert_checks(&tx, &rows) {
          Ok(n) => n,
          Err(e) => return Ok(Err((Phase::Insert, e))),
        };
        if let Err(e) = tx.commit() {
          return Ok(Err((Phase::Insert, e)));
        }
        Ok(Ok((deleted, inserted)))
      })
      .await
      .map_err(|e| ReplaceError::Purge(Error::Database(e)))?;

    match result {
      Ok((deleted, inserted)) => {
        tracing::debug!(deleted, inserted, "replaced check snapshots");
        Ok(inserted)
      }
      Err((Phase::Purge, e)) => Err(ReplaceError::Purge(Error::Sqlite(e))),
      Err((Phase::Insert, e)) => Err(ReplaceError::Insert(Error::Sqlite(e))),
    }
  }

  async fn latest_snapshot(&self, owner_id: Uuid) -> Result<Vec<AutoCheckRecord>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawCheck> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHECK_COLUMNS} FROM auto_checks
           WHERE owner_id = ?1
           ORDER BY site_name, site_url"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawCheck::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheck::into_record).collect()
  }
}
