//! Periodic probe cycles.

use std::time::Duration;

use sitewatch_core::store::{SiteRegistry, SnapshotStore};
use sitewatch_probe::Prober;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info};

use crate::AppState;

/// Spawn a task that runs a cycle immediately and then every `every`.
///
/// A slow cycle delays the next tick rather than stacking runs.
pub fn spawn<S, P>(state: AppState<S, P>, every: Duration) -> JoinHandle<()>
where
  S: SiteRegistry + SnapshotStore + 'static,
  P: Prober + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = every.as_secs(), "scheduler started");

    loop {
      ticker.tick().await;
      match state.run_cycle().await {
        Ok(report) => info!(
          inserted = report.inserted,
          probed = report.probed,
          live = report.live,
          "scheduled probe cycle finished"
        ),
        Err(e) => error!(error = %e, "scheduled probe cycle failed"),
      }
    }
  })
}
