//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Utc};
use sitewatch_core::{
  check::{AutoCheckRecord, ErrorKind},
  site::{NewSite, Site},
  store::{ReplaceError, SiteRegistry, SnapshotStore},
};
use uuid::Uuid;

use crate::{SqliteStore, store::PURGE_CHUNK};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(site: &Site, kind: ErrorKind, checked_at: DateTime<Utc>) -> AutoCheckRecord {
  let (status_code, response_time_ms, is_live) = match kind {
    ErrorKind::Ok => (Some(200), Some(120), true),
    ErrorKind::Forbidden => (Some(403), Some(80), false),
    ErrorKind::ServerError => (Some(502), Some(300), false),
    _ => (None, None, false),
  };
  AutoCheckRecord {
    check_id: Uuid::new_v4(),
    owner_id: site.owner_id,
    site_id: site.site_id,
    site_name: site.name.clone(),
    site_url: site.url.clone(),
    status_code,
    error_kind: kind,
    response_time_ms,
    checked_at,
    is_live,
  }
}

async fn add_sites(s: &SqliteStore, owner: Uuid, n: usize) -> Vec<Site> {
  let mut out = Vec::with_capacity(n);
  for i in 0..n {
    let site = s
      .add_site(NewSite::new(owner, format!("site-{i}"), format!("https://s{i}.example")))
      .await
      .unwrap();
    out.push(site);
  }
  out
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_site() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let site = s
    .add_site(NewSite::new(owner, " Good ", "https://good.example"))
    .await
    .unwrap();
  assert_eq!(site.name, "Good");

  let fetched = s.get_site(site.site_id).await.unwrap().unwrap();
  assert_eq!(fetched, site);
}

#[tokio::test]
async fn get_site_missing_returns_none() {
  let s = store().await;
  assert!(s.get_site(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn add_site_rejects_invalid_url() {
  let s = store().await;
  let err = s
    .add_site(NewSite::new(Uuid::new_v4(), "bad", "not a url"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(sitewatch_core::Error::InvalidUrl { .. })));
  assert!(s.list_sites(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_sites_across_and_per_owner() {
  let s = store().await;
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();
  add_sites(&s, a, 3).await;
  add_sites(&s, b, 2).await;

  assert_eq!(s.list_sites(None).await.unwrap().len(), 5);

  let only_b = s.list_sites(Some(b)).await.unwrap();
  assert_eq!(only_b.len(), 2);
  assert!(only_b.iter().all(|site| site.owner_id == b));
}

#[tokio::test]
async fn remove_site_reports_existence() {
  let s = store().await;
  let site = add_sites(&s, Uuid::new_v4(), 1).await.remove(0);

  assert!(s.remove_site(site.site_id).await.unwrap());
  assert!(!s.remove_site(site.site_id).await.unwrap());
  assert!(s.get_site(site.site_id).await.unwrap().is_none());
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_writes_one_batch_per_owner() {
  let s = store().await;
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();
  let sites_a = add_sites(&s, a, 3).await;
  let sites_b = add_sites(&s, b, 2).await;

  let at = Utc::now();
  let records: Vec<_> = sites_a
    .iter()
    .chain(&sites_b)
    .map(|site| record(site, ErrorKind::Ok, at))
    .collect();

  let inserted = s.replace_snapshots(vec![a, b], records).await.unwrap();
  assert_eq!(inserted, 5);

  let snap_a = s.latest_snapshot(a).await.unwrap();
  let snap_b = s.latest_snapshot(b).await.unwrap();
  assert_eq!(snap_a.len(), 3);
  assert_eq!(snap_b.len(), 2);
  assert!(snap_a.iter().chain(&snap_b).all(|r| r.checked_at == at));
}

#[tokio::test]
async fn second_run_for_one_owner_leaves_others_untouched() {
  let s = store().await;
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();
  let sites_a = add_sites(&s, a, 3).await;
  let sites_b = add_sites(&s, b, 2).await;

  let first = Utc::now();
  let records: Vec<_> = sites_a
    .iter()
    .chain(&sites_b)
    .map(|site| record(site, ErrorKind::Ok, first))
    .collect();
  s.replace_snapshots(vec![a, b], records).await.unwrap();
  let before_b = s.latest_snapshot(b).await.unwrap();

  // Owner A now has a single site left, and it is failing.
  let second = Utc::now();
  let records = vec![record(&sites_a[0], ErrorKind::ServerError, second)];
  s.replace_snapshots(vec![a], records).await.unwrap();

  let snap_a = s.latest_snapshot(a).await.unwrap();
  assert_eq!(snap_a.len(), 1);
  assert_eq!(snap_a[0].error_kind, ErrorKind::ServerError);
  assert_eq!(snap_a[0].status_code, Some(502));
  assert_eq!(snap_a[0].checked_at, second);

  assert_eq!(s.latest_snapshot(b).await.unwrap(), before_b);
}

#[tokio::test]
async fn empty_replace_is_a_noop() {
  let s = store().await;
  let a = Uuid::new_v4();
  let sites = add_sites(&s, a, 2).await;
  let at = Utc::now();
  let records: Vec<_> = sites.iter().map(|site| record(site, ErrorKind::Ok, at)).collect();
  s.replace_snapshots(vec![a], records).await.unwrap();

  assert_eq!(s.replace_snapshots(vec![], vec![]).await.unwrap(), 0);
  assert_eq!(s.purge_snapshots(vec![]).await.unwrap(), 0);
  assert_eq!(s.latest_snapshot(a).await.unwrap().len(), 2);
}

#[tokio::test]
async fn purge_only_touches_named_owners() {
  let s = store().await;
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();
  let at = Utc::now();
  let sa = add_sites(&s, a, 2).await;
  let sb = add_sites(&s, b, 1).await;
  let records: Vec<_> = sa.iter().chain(&sb).map(|site| record(site, ErrorKind::Ok, at)).collect();
  s.insert_records(records).await.unwrap();

  let deleted = s.purge_snapshots(vec![a]).await.unwrap();
  assert_eq!(deleted, 2);
  assert!(s.latest_snapshot(a).await.unwrap().is_empty());
  assert_eq!(s.latest_snapshot(b).await.unwrap().len(), 1);
}

fn synthetic_site(owner_id: Uuid, i: usize) -> Site {
  Site {
    site_id:    Uuid::new_v4(),
    owner_id,
    name:       format!("site-{i}"),
    url:        format!("https://s{i}.example"),
    created_at: Utc::now(),
  }
}

#[tokio::test]
async fn replace_across_more_owners_than_sqlite_binds() {
  // Above SQLite's 32766 host-parameter ceiling for a single statement.
  const OWNERS: usize = 33_000;

  let s = store().await;
  let owners: Vec<Uuid> = (0..OWNERS).map(|_| Uuid::new_v4()).collect();
  let sites: Vec<Site> = owners.iter().enumerate().map(|(i, o)| synthetic_site(*o, i)).collect();
  let bystander = synthetic_site(Uuid::new_v4(), OWNERS);
  s.insert_records(vec![record(&bystander, ErrorKind::Ok, Utc::now())]).await.unwrap();

  for kind in [ErrorKind::Ok, ErrorKind::Timeout] {
    let at = Utc::now();
    let records: Vec<_> = sites.iter().map(|site| record(site, kind, at)).collect();
    let inserted = s.replace_snapshots(owners.clone(), records).await.unwrap();
    assert_eq!(inserted, OWNERS);
  }

  for owner in [owners[0], owners[PURGE_CHUNK], owners[OWNERS - 1]] {
    let snap = s.latest_snapshot(owner).await.unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].error_kind, ErrorKind::Timeout);
  }

  let deleted = s.purge_snapshots(owners).await.unwrap();
  assert_eq!(deleted, OWNERS);
  assert_eq!(s.latest_snapshot(bystander.owner_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_insert_rolls_back_purge() {
  let s = store().await;
  let a = Uuid::new_v4();
  let sites = add_sites(&s, a, 2).await;
  let first = Utc::now();
  let records: Vec<_> = sites.iter().map(|site| record(site, ErrorKind::Ok, first)).collect();
  s.replace_snapshots(vec![a], records).await.unwrap();

  // Two records sharing a primary key make the insert step fail.
  let dup = record(&sites[0], ErrorKind::Timeout, Utc::now());
  let err = s
    .replace_snapshots(vec![a], vec![dup.clone(), dup])
    .await
    .unwrap_err();
  assert!(matches!(err, ReplaceError::Insert(_)));

  let snap = s.latest_snapshot(a).await.unwrap();
  assert_eq!(snap.len(), 2);
  assert!(snap.iter().all(|r| r.checked_at == first && r.error_kind == ErrorKind::Ok));
}

#[tokio::test]
async fn record_fields_roundtrip() {
  let s = store().await;
  let site = add_sites(&s, Uuid::new_v4(), 1).await.remove(0);
  let at = Utc::now();

  let timeout = record(&site, ErrorKind::Timeout, at);
  s.insert_records(vec![timeout.clone()]).await.unwrap();

  let snap = s.latest_snapshot(site.owner_id).await.unwrap();
  assert_eq!(snap, vec![timeout]);
  assert_eq!(snap[0].status_code, None);
  assert_eq!(snap[0].response_time_ms, None);
  assert!(!snap[0].is_live);
}

#[tokio::test]
async fn snapshot_survives_site_removal() {
  let s = store().await;
  let site = add_sites(&s, Uuid::new_v4(), 1).await.remove(0);
  s.insert_records(vec![record(&site, ErrorKind::Ok, Utc::now())])
    .await
    .unwrap();

  s.remove_site(site.site_id).await.unwrap();
  let snap = s.latest_snapshot(site.owner_id).await.unwrap();
  assert_eq!(snap.len(), 1);
  assert_eq!(snap[0].site_url, site.url);
}
