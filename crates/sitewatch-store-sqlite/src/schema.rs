//! SQL schema for the sitewatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS sites (
    site_id     TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    url         TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Snapshot of the most recent automated run per owner.
-- Rows are replaced wholesale per owner, never updated in place.
-- Site columns are copied so a snapshot survives site deletion.
CREATE TABLE IF NOT EXISTS auto_checks (
    check_id          TEXT PRIMARY KEY,
    owner_id          TEXT NOT NULL,
    site_id           TEXT NOT NULL,
    site_name         TEXT NOT NULL,
    site_url          TEXT NOT NULL,
    status_code       INTEGER,          -- NULL when no response was received
    error_kind        TEXT NOT NULL,    -- timeout | dns | 403 | 500 | http | ok
    response_time_ms  INTEGER,
    checked_at        TEXT NOT NULL,    -- RFC 3339, shared by one run
    is_live           INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS sites_owner_idx       ON sites(owner_id);
CREATE INDEX IF NOT EXISTS auto_checks_owner_idx ON auto_checks(owner_id);

PRAGMA user_version = 1;
";
