//! Probe executor, snapshot writer and cycle orchestration.
//!
//! One cycle loads every registered site, probes each one once with a
//! bounded deadline, classifies the results, and replaces the previous
//! automated-check snapshot of every owner involved.
//!
//! ```text
//! run_cycle
//!     ├─► SiteRegistry::list_sites(None)
//!     ├─► Prober::probe(site)            (bounded-parallel)
//!     └─► write_snapshot(outcomes)
//!             └─► SnapshotStore::replace_snapshots(owners, records)
//! ```

pub mod cycle;
pub mod error;
pub mod prober;
pub mod snapshot;

pub use cycle::{CycleOptions, CycleReport, run_cycle};
pub use error::CycleError;
pub use prober::{HttpProber, PROBE_TIMEOUT, Prober};
pub use snapshot::write_snapshot;
