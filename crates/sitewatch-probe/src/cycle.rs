//! One probe cycle: load → probe → classify → replace snapshots.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sitewatch_core::{
  check::ProbeOutcome,
  site::Site,
  store::{ReplaceError, SiteRegistry, SnapshotStore},
};
use tracing::{debug, info};

use crate::{error::CycleError, prober::Prober, snapshot::write_snapshot};

/// Default number of probes in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Tunables for a cycle.
#[derive(Debug, Clone)]
pub struct CycleOptions {
  /// Upper bound on concurrent probes; values below 1 are treated as 1.
  pub concurrency: usize,
}

impl Default for CycleOptions {
  fn default() -> Self { Self { concurrency: DEFAULT_CONCURRENCY } }
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
  pub inserted:   usize,
  pub probed:     usize,
  pub live:       usize,
  pub checked_at: DateTime<Utc>,
}

/// Probe every site with at most `concurrency` requests in flight.
///
/// Completion order is not preserved; outcomes carry their own site.
pub async fn probe_all<P>(prober: &P, sites: Vec<Site>, concurrency: usize) -> Vec<ProbeOutcome>
where
  P: Prober,
{
  stream::iter(sites)
    .map(|site| prober.probe(site))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await
}

/// Run one full cycle across all owners.
///
/// Every site is probed before the purge starts, since the purge scope is
/// the complete set of owners seen in this run.
pub async fn run_cycle<S, P>(
  store: &S,
  prober: &P,
  options: &CycleOptions,
) -> Result<CycleReport, CycleError>
where
  S: SiteRegistry + SnapshotStore,
  P: Prober,
{
  let checked_at = Utc::now();

  let sites = store
    .list_sites(None)
    .await
    .map_err(|e| CycleError::Registry(Box::new(e)))?;
  let probed = sites.len();
  debug!(sites = probed, concurrency = options.concurrency, "starting probe cycle");

  let outcomes = probe_all(prober, sites, options.concurrency).await;
  let live = outcomes.iter().filter(|o| o.is_live).count();

  let inserted = write_snapshot(store, outcomes, checked_at)
    .await
    .map_err(|e| match e {
      ReplaceError::Purge(e) => CycleError::Purge(Box::new(e)),
      ReplaceError::Insert(e) => CycleError::Insert(Box::new(e)),
    })?;

  info!(probed, live, inserted, %checked_at, "probe cycle complete");
  Ok(CycleReport { inserted, probed, live, checked_at })
}
