use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, unixepoch());

CREATE TABLE IF NOT EXISTS products (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    name TEXT NOT NULL,
    assigned_user BLOB CHECK (assigned_user IS NULL OR length(assigned_user) = 16),
    owner_user BLOB CHECK (owner_user IS NULL OR length(owner_user) = 16),
    teams BLOB NOT NULL,
    modified_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS product_channels (
    product_id BLOB NOT NULL CHECK (length(product_id) = 16),
    channel_id BLOB NOT NULL CHECK (length(channel_id) = 16),
    PRIMARY KEY (product_id, channel_id)
);

CREATE TABLE IF NOT EXISTS channels (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    name TEXT NOT NULL,
    locales BLOB
);

CREATE TABLE IF NOT EXISTS attributes (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    name TEXT NOT NULL,
    attr_type TEXT NOT NULL,
    is_multilang INTEGER NOT NULL DEFAULT 0,
    type_value BLOB NOT NULL,
    option_labels BLOB NOT NULL,
    assigned_user BLOB CHECK (assigned_user IS NULL OR length(assigned_user) = 16),
    owner_user BLOB CHECK (owner_user IS NULL OR length(owner_user) = 16),
    teams BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS attribute_values (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    product_id BLOB NOT NULL CHECK (length(product_id) = 16),
    attribute_id BLOB NOT NULL CHECK (length(attribute_id) = 16),
    scope TEXT NOT NULL,
    channel_id BLOB CHECK (channel_id IS NULL OR length(channel_id) = 16),
    locale TEXT,
    product_family_attribute_id BLOB,
    is_required INTEGER NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    modified_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_av_identity
    ON attribute_values (product_id, attribute_id, scope) WHERE deleted = 0;
CREATE INDEX IF NOT EXISTS idx_av_family
    ON attribute_values (product_family_attribute_id) WHERE deleted = 0;

CREATE TABLE IF NOT EXISTS attribute_value_fields (
    value_id BLOB NOT NULL CHECK (length(value_id) = 16),
    field_key TEXT NOT NULL,
    value BLOB NOT NULL,
    PRIMARY KEY (value_id, field_key)
);

CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS job_queue (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    description TEXT NOT NULL,
    job_type TEXT NOT NULL,
    payload TEXT NOT NULL,
    priority INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
";
