//! `POST /run-checks`: run one probe cycle and report how many checks were
//! stored.

use axum::{Json, extract::State};
use serde::Serialize;
use sitewatch_core::store::{SiteRegistry, SnapshotStore};
use sitewatch_probe::Prober;
use tracing::error;

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
  pub inserted: usize,
}

pub async fn handler<S, P>(
  _auth: Authenticated,
  State(state): State<AppState<S, P>>,
) -> Result<Json<TriggerResponse>, Error>
where
  S: SiteRegistry + SnapshotStore + 'static,
  P: Prober + 'static,
{
  let report = state.run_cycle().await.inspect_err(|e| {
    error!(error = %e, "manual probe cycle failed");
  })?;
  Ok(Json(TriggerResponse { inserted: report.inserted }))
}
