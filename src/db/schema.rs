//! SQL DDL for the local preference store.
//!
//! Defines the `preferences` key/value table and the `schema_meta` table. All
//! DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// Schema DDL for the v1 tables. Later columns are added by migrations.
const SCHEMA_SQL: &str = r#"
-- Persisted client state, one JSON document per key
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
