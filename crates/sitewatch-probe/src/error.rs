//! Error type for a probe cycle.
//!
//! Per-site probe failures are never errors; they are classified outcomes.
//! Only failures of the stores abort a cycle.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CycleError {
  /// Sites could not be loaded; no probes were executed.
  #[error("failed to load sites: {0}")]
  Registry(#[source] BoxError),

  /// Prior checks could not be deleted; nothing was inserted.
  #[error("failed to delete previous checks: {0}")]
  Purge(#[source] BoxError),

  /// The new batch could not be inserted.
  #[error("failed to insert checks: {0}")]
  Insert(#[source] BoxError),
}
