use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::info;

/// Brings the schema up to date. Catalog files produced by the older
/// tooling have no `schema_version` table; they are adopted as version 0
/// and upgraded in place.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Database: running migration v1 (catalog and reviews)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS channels (
                idminiapp           TEXT PRIMARY KEY,
                title               TEXT NOT NULL,
                description         TEXT,
                icon                TEXT,
                url                 TEXT,
                is_verified         INTEGER DEFAULT 0,
                rating              REAL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS reviews (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                idminiapp   TEXT NOT NULL REFERENCES channels(idminiapp),
                username    TEXT NOT NULL DEFAULT 'Пользователь',
                rating      INTEGER NOT NULL CHECK(rating >= 1 AND rating <= 5),
                text        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_app
                ON reviews(idminiapp, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Database: running migration v2 (category, screenshots, short description)");
        let columns = channel_columns(conn)?;
        if !columns.contains("category") {
            conn.execute_batch("ALTER TABLE channels ADD COLUMN category TEXT DEFAULT 'Утилиты';")?;
        }
        if !columns.contains("screenshots_path") {
            conn.execute_batch("ALTER TABLE channels ADD COLUMN screenshots_path TEXT;")?;
        }
        if !columns.contains("short_description") {
            conn.execute_batch("ALTER TABLE channels ADD COLUMN short_description TEXT;")?;
        }
        conn.execute_batch("INSERT INTO schema_version (version) VALUES (2);")?;
    }

    info!("Database migrations complete");
    Ok(())
}

fn channel_columns(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(channels)")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(names)
}
