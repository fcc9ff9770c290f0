//! SQL schema for the SQLite group store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per group. The group is stored whole and replaced on every save.
CREATE TABLE IF NOT EXISTS groups (
    tenant_id   TEXT NOT NULL,
    group_id    TEXT NOT NULL,
    body_json   TEXT NOT NULL,   -- serialised santa_core::group::Group
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC; set on every save
    PRIMARY KEY (tenant_id, group_id)
);

CREATE TABLE IF NOT EXISTS profiles (
    tenant_id      TEXT NOT NULL,
    participant_id TEXT NOT NULL,
    display_name   TEXT NOT NULL,
    wishlist       TEXT NOT NULL DEFAULT '',
    dislikes       TEXT NOT NULL DEFAULT '',
    recovery_code  TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    PRIMARY KEY (tenant_id, participant_id)
);

-- Recovery codes are looked up across tenants at sign-in.
CREATE INDEX IF NOT EXISTS profiles_recovery_idx ON profiles(recovery_code);
CREATE INDEX IF NOT EXISTS groups_created_idx    ON groups(tenant_id, created_at);

PRAGMA user_version = 1;
";
