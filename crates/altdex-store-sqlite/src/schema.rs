//! SQL schema for the altdex SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS listings (
    listing_id             TEXT PRIMARY KEY,
    name                   TEXT NOT NULL,
    slug                   TEXT NOT NULL UNIQUE,  -- derived from name, globally unique
    url                    TEXT NOT NULL,
    repo_url               TEXT UNIQUE,           -- NULLs are exempt from UNIQUE in SQLite
    description            TEXT NOT NULL DEFAULT '',
    status                 TEXT NOT NULL,         -- 'pending' | 'approved' | 'rejected'
    submission_plan        TEXT NOT NULL,         -- 'free' | 'sponsor'
    owner_id               TEXT,
    submitter_email        TEXT,
    pending_order_ref      TEXT,
    payment_ref            TEXT,
    sponsor_paid_at        TEXT,                  -- ISO 8601 UTC
    sponsor_featured_until TEXT,
    sponsor_priority_until TEXT,
    newsletter_included    INTEGER NOT NULL DEFAULT 0,
    rejection_reason       TEXT,
    rejected_at            TEXT,
    created_at             TEXT NOT NULL
);

-- Ad records are never deleted; deactivated and expired ads keep their
-- impression/click history.
CREATE TABLE IF NOT EXISTS advertisements (
    ad_id             TEXT PRIMARY KEY,
    ad_type           TEXT NOT NULL,   -- 'banner' | 'card' | 'popup'
    owner_id          TEXT,
    status            TEXT NOT NULL,   -- 'pending' | 'approved' | 'rejected'
    headline          TEXT NOT NULL,
    destination_url   TEXT NOT NULL,
    logo_url          TEXT,
    pending_order_ref TEXT,
    payment_ref       TEXT,
    is_active         INTEGER NOT NULL DEFAULT 0,
    start_date        TEXT,
    end_date          TEXT,
    impressions       INTEGER NOT NULL DEFAULT 0,
    clicks            INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS listings_slug_idx     ON listings(slug);
CREATE INDEX IF NOT EXISTS listings_plan_idx     ON listings(submission_plan, sponsor_priority_until);
CREATE INDEX IF NOT EXISTS listings_created_idx  ON listings(created_at);
CREATE INDEX IF NOT EXISTS ads_type_idx          ON advertisements(ad_type, status);
CREATE INDEX IF NOT EXISTS ads_created_idx       ON advertisements(created_at);

PRAGMA user_version = 1;
";
