//! Namespaced vector index abstraction and its backends.

pub mod pinecone;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata stored next to every vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub text: String,
    pub page_number: u32,
}

/// The unit persisted to the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Content hash of the chunk text.
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

/// A similarity-search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub id: String,
    /// Similarity score, higher is more relevant. Some services omit it.
    pub score: Option<f64>,
    /// Present when metadata was requested and stored.
    pub metadata: Option<RecordMetadata>,
}

/// Vector storage partitioned by namespace.
///
/// Records never cross namespaces: ids only need to be unique within one.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite `records` under `namespace`.
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> anyhow::Result<()>;

    /// Return up to `top_k` records of `namespace` most similar to `vector`,
    /// best first.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> anyhow::Result<Vec<MatchResult>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Cosine similarity of two equal-length vectors. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
