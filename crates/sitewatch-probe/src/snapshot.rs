//! Snapshot writer: turns one run's outcomes into the new and only
//! automated-check state of every owner involved.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sitewatch_core::{
  check::{AutoCheckRecord, ProbeOutcome},
  store::{ReplaceError, SnapshotStore},
};
use uuid::Uuid;

/// Replace the snapshots of every owner present in `outcomes`.
///
/// All records are stamped with `checked_at`. Owners absent from `outcomes`
/// are never touched; an empty run issues no store call and returns `0`.
pub async fn write_snapshot<S>(
  store: &S,
  outcomes: Vec<ProbeOutcome>,
  checked_at: DateTime<Utc>,
) -> Result<usize, ReplaceError<S::Error>>
where
  S: SnapshotStore,
{
  if outcomes.is_empty() {
    return Ok(0);
  }

  let owners: Vec<Uuid> = outcomes
    .iter()
    .map(|o| o.site.owner_id)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();

  let records: Vec<AutoCheckRecord> = outcomes
    .into_iter()
    .map(|o| AutoCheckRecord::from_outcome(o, checked_at))
    .collect();

  tracing::debug!(owners = owners.len(), records = records.len(), "writing snapshot");
  store.replace_snapshots(owners, records).await
}
