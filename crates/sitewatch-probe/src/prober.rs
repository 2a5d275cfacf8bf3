//! Probe executor: one bounded GET per site, classified into a
//! [`ProbeOutcome`].

use std::{
  error::Error as StdError,
  future::Future,
  time::{Duration, Instant},
};

use sitewatch_core::{
  check::{FailureSignal, ProbeOutcome},
  classify::{classify, is_live},
  site::Site,
};

/// Maximum time a single probe may wait for response headers.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(12_000);

const MAX_REDIRECTS: usize = 10;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Something that can check a site once.
///
/// Probing is infallible: every network failure is folded into the returned
/// outcome's [`ErrorKind`](sitewatch_core::check::ErrorKind).
pub trait Prober: Send + Sync {
  fn probe(&self, site: Site) -> impl Future<Output = ProbeOutcome> + Send + '_;
}

// ─── Outcome builders ────────────────────────────────────────────────────────

/// Outcome for a site that answered with `status` after `elapsed`.
pub fn responded(site: Site, status: u16, elapsed: Duration) -> ProbeOutcome {
  ProbeOutcome {
    site,
    status_code: Some(status),
    elapsed_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
    is_live: is_live(status),
    error_kind: classify(Some(status), None),
  }
}

/// Outcome for a site that produced no response at all.
pub fn unreachable(site: Site, signal: FailureSignal) -> ProbeOutcome {
  ProbeOutcome {
    site,
    status_code: None,
    elapsed_ms: None,
    is_live: false,
    error_kind: classify(None, Some(signal)),
  }
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// [`Prober`] backed by a shared [`reqwest::Client`].
///
/// Cheap to clone; the inner client is `Arc`-based. Build one per process
/// and hand it to every cycle.
#[derive(Clone)]
pub struct HttpProber {
  client:  reqwest::Client,
  timeout: Duration,
}

impl HttpProber {
  /// A prober with the standard 12 s deadline.
  pub fn new() -> reqwest::Result<Self> { Self::with_timeout(PROBE_TIMEOUT) }

  pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder()
      .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
      .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self::from_client(client, timeout))
  }

  pub fn from_client(client: reqwest::Client, timeout: Duration) -> Self {
    Self { client, timeout }
  }

  pub fn timeout(&self) -> Duration { self.timeout }
}

impl Prober for HttpProber {
  async fn probe(&self, site: Site) -> ProbeOutcome {
    let started = Instant::now();
    let request = self.client.get(&site.url).send();

    // Dropping the in-flight request on expiry aborts it; other probes
    // are unaffected.
    match tokio::time::timeout(self.timeout, request).await {
      Ok(Ok(response)) => {
        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        tracing::debug!(url = %site.url, status, elapsed_ms = elapsed.as_millis() as u64, "probe answered");
        responded(site, status, elapsed)
      }
      Ok(Err(err)) => {
        let signal = failure_signal(&err);
        tracing::debug!(url = %site.url, ?signal, error = %err, "probe failed");
        unreachable(site, signal)
      }
      Err(_) => {
        tracing::debug!(url = %site.url, timeout_ms = self.timeout.as_millis() as u64, "probe timed out");
        unreachable(site, FailureSignal::Timeout)
      }
    }
  }
}

// ─── Failure signals ─────────────────────────────────────────────────────────

/// Map a transport error onto a structured [`FailureSignal`].
pub fn failure_signal(err: &reqwest::Error) -> FailureSignal {
  if err.is_timeout() {
    FailureSignal::Timeout
  } else if is_name_resolution_failure(err) {
    FailureSignal::Dns
  } else if err.is_connect() {
    FailureSignal::Connection
  } else {
    FailureSignal::Other
  }
}

/// reqwest exposes no typed resolver error, so walk the source chain for the
/// resolver's messages (hyper's connector and the system `getaddrinfo`).
fn is_name_resolution_failure(err: &(dyn StdError + 'static)) -> bool {
  let mut current = Some(err);
  while let Some(e) = current {
    let msg = e.to_string().to_ascii_lowercase();
    if msg.starts_with("dns error")
      || msg.contains("failed to lookup address")
      || msg.contains("name or service not known")
      || msg.contains("no such host")
    {
      return true;
    }
    current = e.source();
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::{fmt, io, net::SocketAddr};

  use axum::{Router, http::StatusCode, response::Redirect, routing::get};
  use chrono::Utc;
  use sitewatch_core::check::ErrorKind;
  use uuid::Uuid;

  fn site(url: impl Into<String>) -> Site {
    Site {
      site_id:    Uuid::new_v4(),
      owner_id:   Uuid::new_v4(),
      name:       "test".into(),
      url:        url.into(),
      created_at: Utc::now(),
    }
  }

  fn prober(timeout: Duration) -> HttpProber {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpProber::from_client(client, timeout)
  }

  async fn serve() -> SocketAddr {
    let app = Router::new()
      .route("/ok", get(|| async { "ok" }))
      .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }))
      .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
      .route("/bad-gateway", get(|| async { StatusCode::BAD_GATEWAY }))
      .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
      .route("/redirect", get(|| async { Redirect::temporary("/ok") }))
      .route(
        "/slow",
        get(|| async {
          tokio::time::sleep(Duration::from_secs(5)).await;
          "late"
        }),
      );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
  }

  // ── Outcome builders ────────────────────────────────────────────────────────

  #[test]
  fn responded_classifies_status() {
    let good = responded(site("https://good.example"), 200, Duration::from_millis(150));
    assert!(good.is_live);
    assert_eq!(good.status_code, Some(200));
    assert_eq!(good.elapsed_ms, Some(150));
    assert_eq!(good.error_kind, ErrorKind::Ok);

    let gone = responded(site("https://gone.example"), 404, Duration::from_millis(20));
    assert!(!gone.is_live);
    assert_eq!(gone.error_kind, ErrorKind::Http);
  }

  #[test]
  fn unreachable_has_no_measurements() {
    let dead = unreachable(site("https://dead.example"), FailureSignal::Timeout);
    assert!(!dead.is_live);
    assert_eq!(dead.status_code, None);
    assert_eq!(dead.elapsed_ms, None);
    assert_eq!(dead.error_kind, ErrorKind::Timeout);

    let nx = unreachable(site("https://nx.example"), FailureSignal::Dns);
    assert_eq!(nx.error_kind, ErrorKind::Dns);
  }

  // ── Resolver detection ──────────────────────────────────────────────────────

  #[derive(Debug)]
  struct Wrapped(io::Error);

  impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("error sending request") }
  }

  impl StdError for Wrapped {
    fn source(&self) -> Option<&(dyn StdError + 'static)> { Some(&self.0) }
  }

  #[test]
  fn resolver_message_anywhere_in_chain_is_dns() {
    let err = Wrapped(io::Error::other(
      "failed to lookup address information: Name or service not known",
    ));
    assert!(is_name_resolution_failure(&err));

    let refused = Wrapped(io::Error::from(io::ErrorKind::ConnectionRefused));
    assert!(!is_name_resolution_failure(&refused));
  }

  // ── Live probes against a local server ──────────────────────────────────────

  #[tokio::test]
  async fn probe_classifies_live_responses() {
    let addr = serve().await;
    let p = prober(Duration::from_secs(5));

    let ok = p.probe(site(format!("http://{addr}/ok"))).await;
    assert!(ok.is_live);
    assert_eq!(ok.status_code, Some(200));
    assert_eq!(ok.error_kind, ErrorKind::Ok);
    assert!(ok.elapsed_ms.is_some());

    let forbidden = p.probe(site(format!("http://{addr}/forbidden"))).await;
    assert!(!forbidden.is_live);
    assert_eq!(forbidden.status_code, Some(403));
    assert_eq!(forbidden.error_kind, ErrorKind::Forbidden);

    let boom = p.probe(site(format!("http://{addr}/boom"))).await;
    assert_eq!(boom.error_kind, ErrorKind::ServerError);

    let gateway = p.probe(site(format!("http://{addr}/bad-gateway"))).await;
    assert_eq!(gateway.status_code, Some(502));
    assert_eq!(gateway.error_kind, ErrorKind::ServerError);

    let teapot = p.probe(site(format!("http://{addr}/teapot"))).await;
    assert_eq!(teapot.error_kind, ErrorKind::Http);

    let missing = p.probe(site(format!("http://{addr}/nowhere"))).await;
    assert_eq!(missing.status_code, Some(404));
    assert_eq!(missing.error_kind, ErrorKind::Http);
    assert!(missing.elapsed_ms.is_some());
  }

  #[tokio::test]
  async fn probe_follows_redirects() {
    let addr = serve().await;
    let outcome = prober(Duration::from_secs(5))
      .probe(site(format!("http://{addr}/redirect")))
      .await;
    assert_eq!(outcome.status_code, Some(200));
    assert!(outcome.is_live);
  }

  #[tokio::test]
  async fn slow_site_is_aborted_as_timeout() {
    let addr = serve().await;
    let p = prober(Duration::from_millis(200));

    let started = Instant::now();
    let outcome = p.probe(site(format!("http://{addr}/slow"))).await;
    assert!(started.elapsed() < Duration::from_secs(4));

    assert!(!outcome.is_live);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.elapsed_ms, None);
    assert_eq!(outcome.error_kind, ErrorKind::Timeout);
  }

  #[tokio::test]
  async fn refused_connection_is_generic_http_failure() {
    let port = {
      let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
      listener.local_addr().unwrap().port()
    };
    let outcome = prober(Duration::from_secs(5))
      .probe(site(format!("http://127.0.0.1:{port}/")))
      .await;
    assert!(!outcome.is_live);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.error_kind, ErrorKind::Http);
  }

  #[tokio::test]
  async fn malformed_url_is_generic_http_failure() {
    let outcome = prober(Duration::from_secs(1)).probe(site("not a url")).await;
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.error_kind, ErrorKind::Http);
  }

  #[tokio::test]
  async fn unresolvable_host_is_dns_failure() {
    // `.invalid` never resolves (RFC 6761).
    let outcome = prober(Duration::from_secs(10))
      .probe(site("http://no-such-host.sitewatch.invalid/"))
      .await;
    assert!(!outcome.is_live);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.elapsed_ms, None);
    assert_eq!(outcome.error_kind, ErrorKind::Dns);
  }

  #[test]
  fn default_deadline_is_twelve_seconds() {
    assert_eq!(PROBE_TIMEOUT, Duration::from_millis(12_000));
    assert_eq!(HttpProber::new().unwrap().timeout(), PROBE_TIMEOUT);
  }
}
