//! The `SiteRegistry` and `SnapshotStore` traits.
//!
//! Both are implemented by storage backends (e.g. `sitewatch-store-sqlite`).
//! The probe engine and the HTTP layers depend on these abstractions, not on
//! any concrete backend.

use std::{error::Error as StdError, fmt, future::Future};

use uuid::Uuid;

use crate::{
  check::AutoCheckRecord,
  site::{NewSite, Site},
};

// ─── Registry ────────────────────────────────────────────────────────────────

/// Durable store of monitored sites, keyed by owning user.
pub trait SiteRegistry: Send + Sync {
  type Error: StdError + Send + Sync + 'static;

  /// List sites across all owners, or only those of `owner_id`.
  fn list_sites(
    &self,
    owner_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Site>, Self::Error>> + Send + '_;

  /// Retrieve a site by UUID. Returns `None` if not found.
  fn get_site(
    &self,
    site_id: Uuid,
  ) -> impl Future<Output = Result<Option<Site>, Self::Error>> + Send + '_;

  /// Register a new site. `site_id` and `created_at` are set by the store.
  fn add_site(
    &self,
    input: NewSite,
  ) -> impl Future<Output = Result<Site, Self::Error>> + Send + '_;

  /// Remove a site. Returns `false` if it did not exist.
  fn remove_site(
    &self,
    site_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Snapshot store ──────────────────────────────────────────────────────────

/// Which half of a snapshot replacement failed.
#[derive(Debug)]
pub enum ReplaceError<E> {
  /// Deleting the previous snapshot failed; nothing was inserted.
  Purge(E),
  /// Inserting the new batch failed.
  Insert(E),
}

impl<E: fmt::Display> fmt::Display for ReplaceError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Purge(e) => write!(f, "failed to purge previous checks: {e}"),
      Self::Insert(e) => write!(f, "failed to insert checks: {e}"),
    }
  }
}

impl<E: StdError + 'static> StdError for ReplaceError<E> {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match self {
      Self::Purge(e) | Self::Insert(e) => Some(e),
    }
  }
}

/// Persistence for automated-check snapshots.
///
/// An owner's snapshot is only ever replaced wholesale: old records for the
/// owner are purged and the new batch inserted.
pub trait SnapshotStore: Send + Sync {
  type Error: StdError + Send + Sync + 'static;

  /// Delete every record belonging to any of `owner_ids`. Returns the number
  /// of rows removed. An empty owner list deletes nothing.
  fn purge_snapshots(
    &self,
    owner_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert `records` as-is. Returns the number of rows written.
  fn insert_records(
    &self,
    records: Vec<AutoCheckRecord>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Purge `owner_ids`, then insert `records`.
  ///
  /// The default runs the two steps as independent writes: a failed purge
  /// skips the insert, but a failed insert leaves the owners with no records
  /// until the next successful run. Backends with transactions should
  /// override this so both steps commit or roll back together.
  fn replace_snapshots(
    &self,
    owner_ids: Vec<Uuid>,
    records: Vec<AutoCheckRecord>,
  ) -> impl Future<Output = Result<usize, ReplaceError<Self::Error>>> + Send + '_ {
    async move {
      self.purge_snapshots(owner_ids).await.map_err(ReplaceError::Purge)?;
      self.insert_records(records).await.map_err(ReplaceError::Insert)
    }
  }

  /// The owner's current snapshot, ordered by site name.
  fn latest_snapshot(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AutoCheckRecord>, Self::Error>> + Send + '_;
}
