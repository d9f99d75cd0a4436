//! SQL schema for the Folio SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- `seq` is AUTOINCREMENT so it is never reused after a delete; it orders
-- contacts that share a created_at timestamp.
CREATE TABLE IF NOT EXISTS contacts (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    subject     TEXT NOT NULL,
    message     TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'new'
                CHECK (status IN ('new', 'read', 'replied', 'archived')),
    ip_address  TEXT,
    user_agent  TEXT,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed width; server-assigned
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_created_idx ON contacts(created_at, seq);
CREATE INDEX IF NOT EXISTS contacts_status_idx  ON contacts(status, created_at, seq);

PRAGMA user_version = 1;
";
