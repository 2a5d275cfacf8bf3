//! HTTP surface for sitewatch.
//!
//! Exposes an axum [`Router`] with the manual cycle trigger, CORS preflight
//! handling, and the bearer-protected JSON API, backed by any store that
//! implements both [`SiteRegistry`] and [`SnapshotStore`].
//!
//! ```text
//! POST    /run-checks   → run_cycle → {"inserted": n}
//! OPTIONS /run-checks   → 200 (CORS preflight)
//!         /api/...      → sitewatch_api::api_router
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod scheduler;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware, routing::post};
use serde::Deserialize;
use sitewatch_core::store::{SiteRegistry, SnapshotStore};
use sitewatch_probe::{CycleError, CycleOptions, CycleReport, Prober, cycle::DEFAULT_CONCURRENCY};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use auth::{AuthConfig, Authenticated};
use handlers::{options, trigger};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SITEWATCH_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  pub store_path:             PathBuf,
  /// argon2 PHC string of the bearer token accepted by `/run-checks` and `/api`.
  #[serde(default)]
  pub trigger_token_hash:     Option<String>,
  #[serde(default = "default_concurrency")]
  pub probe_concurrency:      usize,
  #[serde(default = "default_timeout_ms")]
  pub probe_timeout_ms:       u64,
  /// Run a cycle every this many seconds; unset disables the scheduler.
  #[serde(default)]
  pub schedule_interval_secs: Option<u64>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_concurrency() -> usize { DEFAULT_CONCURRENCY }
fn default_timeout_ms() -> u64 {
  u64::try_from(sitewatch_probe::PROBE_TIMEOUT.as_millis()).unwrap_or(12_000)
}

impl ServerConfig {
  pub fn probe_timeout(&self) -> Duration { Duration::from_millis(self.probe_timeout_ms) }

  pub fn schedule_interval(&self) -> Option<Duration> {
    self.schedule_interval_secs.filter(|s| *s > 0).map(Duration::from_secs)
  }

  /// The configured credential, if any. Blank values count as unset.
  pub fn auth_config(&self) -> Option<AuthConfig> {
    self
      .trigger_token_hash
      .as_deref()
      .map(str::trim)
      .filter(|h| !h.is_empty())
      .map(|h| AuthConfig { token_hash: h.to_string() })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:  Arc<S>,
  pub prober: Arc<P>,
  pub config: Arc<ServerConfig>,
  pub auth:   Option<Arc<AuthConfig>>,
}

impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      prober: self.prober.clone(),
      config: self.config.clone(),
      auth:   self.auth.clone(),
    }
  }
}

impl<S, P> AppState<S, P>
where
  S: SiteRegistry + SnapshotStore,
  P: Prober,
{
  pub fn new(store: Arc<S>, prober: Arc<P>, config: ServerConfig) -> Self {
    let auth = config.auth_config().map(Arc::new);
    Self { store, prober, config: Arc::new(config), auth }
  }

  /// Run one probe cycle with the configured concurrency.
  pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
    let options = CycleOptions { concurrency: self.config.probe_concurrency };
    sitewatch_probe::run_cycle(self.store.as_ref(), self.prober.as_ref(), &options).await
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: SiteRegistry + SnapshotStore + 'static,
  P: Prober + 'static,
{
  let api = sitewatch_api::api_router(state.store.clone()).route_layer(
    middleware::from_extractor_with_state::<Authenticated, _>(state.clone()),
  );

  Router::new()
    .route("/run-checks", post(trigger::handler::<S, P>).options(options::handler))
    .with_state(state)
    .nest("/api", api)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}
