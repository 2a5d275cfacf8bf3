//! Classification policy: pure mapping from probe signals to [`ErrorKind`].

use crate::check::{ErrorKind, FailureSignal};

/// A site is live iff it answered with a status in `[200, 400)`.
pub fn is_live(status: u16) -> bool { (200..400).contains(&status) }

/// Map a probe's status code and failure signal to an [`ErrorKind`].
///
/// Rules are evaluated in order, first match wins:
///
/// 1. timeout signal → `timeout`
/// 2. name-resolution signal → `dns`
/// 3. status `403` → `403`
/// 4. status `>= 500` → `500`
/// 5. status in `[400, 500)` → `http`
/// 6. any other status (`< 400`) → `ok`
/// 7. no status and no recognised signal → `http`
pub fn classify(status: Option<u16>, failure: Option<FailureSignal>) -> ErrorKind {
  match (failure, status) {
    (Some(FailureSignal::Timeout), _) => ErrorKind::Timeout,
    (Some(FailureSignal::Dns), _) => ErrorKind::Dns,
    (_, Some(403)) => ErrorKind::Forbidden,
    (_, Some(s)) if s >= 500 => ErrorKind::ServerError,
    (_, Some(s)) if s >= 400 => ErrorKind::Http,
    (_, Some(_)) => ErrorKind::Ok,
    (_, None) => ErrorKind::Http,
  }
}
