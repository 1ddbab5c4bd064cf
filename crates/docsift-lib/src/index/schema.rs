use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

/// Define all schema migrations.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // v1: Initial schema
        M::up(
            "CREATE TABLE records (
                namespace    TEXT NOT NULL,
                id           TEXT NOT NULL,
                vector       TEXT NOT NULL,
                text         TEXT NOT NULL,
                page_number  INTEGER NOT NULL,
                created_at   TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at   TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (namespace, id)
            );",
        ),
    ])
}

/// Apply all pending migrations to the database.
pub fn apply_migrations(conn: &mut Connection) -> anyhow::Result<()> {
    migrations()
        .to_latest(conn)
        .map_err(|e| anyhow::anyhow!("Failed to apply migrations: {e}"))?;
    Ok(())
}
