#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use rusqlite::{Connection, params};
use tracing::debug;

use super::schema::apply_migrations;
use super::{IndexRecord, MatchResult, RecordMetadata, VectorIndex, cosine_similarity};

/// Local vector index stored in a SQLite database.
///
/// Vectors are stored as JSON arrays and scored with cosine similarity by a
/// full scan of the queried namespace.
pub struct SqliteIndex {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteIndex {
    /// Open (or create) the index database at `path` and migrate it.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open index database {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory index.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory index")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> anyhow::Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of records stored under `namespace`.
    pub fn count(&self, namespace: &str) -> anyhow::Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM records WHERE namespace = ?1",
                params![namespace],
                |row| row.get(0),
            )
            .context("Failed to count records")?;
        Ok(count as usize)
    }
}

fn lock(conn: &Mutex<Connection>) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow::anyhow!("index connection lock poisoned"))
}

fn upsert_records(
    conn: &mut Connection,
    namespace: &str,
    records: &[IndexRecord],
) -> anyhow::Result<()> {
    let tx = conn.transaction().context("Failed to begin upsert")?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO records (namespace, id, vector, text, page_number, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
             ON CONFLICT(namespace, id) DO UPDATE SET
               vector = excluded.vector,
               text = excluded.text,
               page_number = excluded.page_number,
               updated_at = datetime('now')",
        )?;
        for record in records {
            let vector_json = serde_json::to_string(&record.values)?;
            stmt.execute(params![
                namespace,
                record.id,
                vector_json,
                record.metadata.text,
                i64::from(record.metadata.page_number),
            ])
            .with_context(|| format!("Failed to upsert record {}", record.id))?;
        }
    }
    tx.commit().context("Failed to commit upsert")?;
    Ok(())
}

fn query_records(
    conn: &Connection,
    namespace: &str,
    vector: &[f32],
    top_k: usize,
    include_metadata: bool,
) -> anyhow::Result<Vec<MatchResult>> {
    let mut stmt = conn
        .prepare("SELECT id, vector, text, page_number FROM records WHERE namespace = ?1")
        .context("Failed to prepare query")?;
    let rows = stmt
        .query_map(params![namespace], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to scan namespace")?;

    let mut scored = Vec::with_capacity(rows.len());
    for (id, vector_json, text, page_number) in rows {
        let stored: Vec<f32> = serde_json::from_str(&vector_json)
            .with_context(|| format!("Corrupt vector for record {id}"))?;
        anyhow::ensure!(
            stored.len() == vector.len(),
            "Query vector has dimension {} but record {id} has {}",
            vector.len(),
            stored.len()
        );
        let score = cosine_similarity(&stored, vector);
        let metadata = include_metadata.then(|| RecordMetadata {
            text,
            page_number: page_number as u32,
        });
        scored.push(MatchResult {
            id,
            score: Some(f64::from(score)),
            metadata,
        });
    }

    scored.sort_by(|a, b| b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0)));
    scored.truncate(top_k);
    Ok(scored)
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> anyhow::Result<()> {
        let conn = Arc::clone(&self.conn);
        let namespace = namespace.to_string();
        let records = records.to_vec();
        let count = records.len();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut conn = lock(&conn)?;
            upsert_records(&mut conn, &namespace, &records)?;
            debug!(namespace = %namespace, count, "Upserted records");
            Ok(())
        })
        .await
        .context("Index upsert task panicked")?
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> anyhow::Result<Vec<MatchResult>> {
        let conn = Arc::clone(&self.conn);
        let namespace = namespace.to_string();
        let vector = vector.to_vec();
        tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<MatchResult>> {
            let conn = lock(&conn)?;
            let matches = query_records(&conn, &namespace, &vector, top_k, include_metadata)?;
            debug!(
                namespace = %namespace,
                top_k,
                result_count = matches.len(),
                "Vector search completed"
            );
            Ok(matches)
        })
        .await
        .context("Index query task panicked")?
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
