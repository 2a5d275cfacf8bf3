//! Handlers for `/sites` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sites` | Optional `?owner_id=<uuid>` |
//! | `POST`   | `/sites` | Body: `{"owner_id":"…","name":"…","url":"https://…"}` |
//! | `GET`    | `/sites/{id}` | 404 if not found |
//! | `DELETE` | `/sites/{id}` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sitewatch_core::{
  site::{NewSite, Site},
  store::SiteRegistry,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner_id: Option<Uuid>,
}

/// `GET /sites[?owner_id=<uuid>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Site>>, ApiError>
where
  S: SiteRegistry,
{
  let sites = store
    .list_sites(params.owner_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sites))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /sites`: returns 201 + the registered [`Site`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSite>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SiteRegistry,
{
  body.validate()?;
  let site = store.add_site(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(site)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /sites/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Site>, ApiError>
where
  S: SiteRegistry,
{
  let site = store
    .get_site(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("site {id} not found")))?;
  Ok(Json(site))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /sites/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SiteRegistry,
{
  if store.remove_site(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("site {id} not found")))
  }
}
