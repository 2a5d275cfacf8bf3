//! Handler for `GET /checks?owner_id=<uuid>`: the owner's latest automated
//! snapshot.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use sitewatch_core::{check::AutoCheckRecord, store::SnapshotStore};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SnapshotParams {
  pub owner_id: Uuid,
}

/// `GET /checks?owner_id=<uuid>`
pub async fn latest<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SnapshotParams>,
) -> Result<Json<Vec<AutoCheckRecord>>, ApiError>
where
  S: SnapshotStore,
{
  let records = store
    .latest_snapshot(params.owner_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}
