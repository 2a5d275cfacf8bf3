//! JSON REST API for the sitewatch registry and snapshots.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`SiteRegistry`] and [`SnapshotStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sitewatch_api::api_router(store.clone()))
//! ```

pub mod checks;
pub mod error;
pub mod sites;

use std::sync::Arc;

use axum::{Router, routing::get};
use sitewatch_core::store::{SiteRegistry, SnapshotStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SiteRegistry + SnapshotStore + 'static,
{
  Router::new()
    // Registry
    .route("/sites", get(sites::list::<S>).post(sites::create::<S>))
    .route("/sites/{id}", get(sites::get_one::<S>).delete(sites::delete_one::<S>))
    // Snapshots
    .route("/checks", get(checks::latest::<S>))
    .with_state(store)
}
