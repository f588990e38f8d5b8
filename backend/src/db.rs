//! SQLite persistence. One file database, connections opened per operation.

use rusqlite::Connection;

pub const DB_PATH: &str = "docugen.sqlite";

pub fn open() -> Result<Connection, String> {
    Connection::open(DB_PATH).map_err(|e| e.to_string())
}

/// Creates the schema if missing. Called once at startup.
///
/// `placeholders` holds the reconciled `PlaceholderSpec` list as JSON.
/// `datasource_md5`/`datasource_verified` track the uploaded CSV for bulk
/// generation. Templates are never deleted, only deactivated, so
/// `generated_docs.template_id` stays resolvable.
pub fn init() -> Result<(), String> {
    let conn = open()?;
    init_schema(&conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS templates (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL,
            category            TEXT NOT NULL,
            body                TEXT NOT NULL,
            placeholders        TEXT NOT NULL,
            is_active           INTEGER NOT NULL DEFAULT 1,
            usage_count         INTEGER NOT NULL DEFAULT 0,
            datasource_md5      TEXT,
            datasource_verified INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS generated_docs (
            id          TEXT PRIMARY KEY,
            template_id TEXT NOT NULL REFERENCES templates(id),
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );",
    )
    .map_err(|e| e.to_string())
}
