//! SQLite connection pool and schema.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Statements run at start-up; all idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id          INTEGER PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT,
        area        TEXT,
        container   TEXT,
        bin         TEXT,
        quantity    INTEGER DEFAULT 1,
        cost        REAL DEFAULT 0.0,
        url         TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items_tags (
        id      INTEGER PRIMARY KEY,
        item_id INTEGER NOT NULL,
        tag     TEXT NOT NULL,
        FOREIGN KEY (item_id) REFERENCES items (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_items_area ON items (area)",
    "CREATE INDEX IF NOT EXISTS idx_items_container ON items (container)",
    "CREATE INDEX IF NOT EXISTS idx_items_bin ON items (bin)",
    "CREATE INDEX IF NOT EXISTS idx_items_tags_item ON items_tags (item_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_tags_tag ON items_tags (tag)",
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS items_fts USING fts5 (
        name, description, area, container, bin,
        content='items', content_rowid='id', tokenize='porter'
    )
    "#,
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS items_tags_fts USING fts5 (
        tag,
        content='items_tags', content_rowid='id', tokenize='porter'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_ai AFTER INSERT ON items BEGIN
        INSERT INTO items_fts (rowid, name, description, area, container, bin)
        VALUES (new.id, new.name, new.description, new.area, new.container, new.bin);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_ad AFTER DELETE ON items BEGIN
        INSERT INTO items_fts (items_fts, rowid, name, description, area, container, bin)
        VALUES ('delete', old.id, old.name, old.description, old.area, old.container, old.bin);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_au AFTER UPDATE ON items BEGIN
        INSERT INTO items_fts (items_fts, rowid, name, description, area, container, bin)
        VALUES ('delete', old.id, old.name, old.description, old.area, old.container, old.bin);
        INSERT INTO items_fts (rowid, name, description, area, container, bin)
        VALUES (new.id, new.name, new.description, new.area, new.container, new.bin);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_tags_ai AFTER INSERT ON items_tags BEGIN
        INSERT INTO items_tags_fts (rowid, tag) VALUES (new.id, new.tag);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_tags_ad AFTER DELETE ON items_tags BEGIN
        INSERT INTO items_tags_fts (items_tags_fts, rowid, tag) VALUES ('delete', old.id, old.tag);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_tags_au AFTER UPDATE ON items_tags BEGIN
        INSERT INTO items_tags_fts (items_tags_fts, rowid, tag) VALUES ('delete', old.id, old.tag);
        INSERT INTO items_tags_fts (rowid, tag) VALUES (new.id, new.tag);
    END
    "#,
];

/// Open (creating if needed) the database at `url` and apply the schema.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid DATABASE_URL {url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite database at {url}"))?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with the schema applied.
///
/// Each call yields an independent, empty database. The pool never recycles
/// its connection, which would discard the data.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .context("invalid in-memory SQLite URL")?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("failed to open in-memory SQLite database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .with_context(|| format!("failed to apply schema statement: {}", statement.trim()))?;
    }
    tracing::debug!(statements = SCHEMA.len(), "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_idempotent_and_fts_tracks_writes() {
        let pool = connect_in_memory().await.unwrap();
        init_schema(&pool).await.unwrap();

        sqlx::query("INSERT INTO items (name, description) VALUES ('Cordless drill', 'drills holes')")
            .execute(&pool)
            .await
            .unwrap();

        let hits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items_fts WHERE items_fts MATCH 'drilling'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(hits, 1, "porter stemming should match drill/drilling");

        sqlx::query("UPDATE items SET name = 'Hammer', description = NULL")
            .execute(&pool)
            .await
            .unwrap();
        let hits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items_fts WHERE items_fts MATCH 'drill'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn deleting_an_item_cascades_to_tags() {
        let pool = connect_in_memory().await.unwrap();
        let id = sqlx::query("INSERT INTO items (name) VALUES ('Tape')")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();
        sqlx::query("INSERT INTO items_tags (item_id, tag) VALUES (?, 'office')")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();

        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();

        let tags: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items_tags")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(tags, 0);
    }
}
