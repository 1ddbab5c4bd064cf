//! In-memory collaborators for exercising the pipelines without network,
//! PDF or model access.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::extract::{Page, PageExtractor};
use crate::index::{IndexRecord, MatchResult, VectorIndex, cosine_similarity};
use crate::storage::ObjectStore;

/// Build a [`Page`].
pub fn page(text: &str, page_number: u32) -> Page {
    Page {
        text: text.to_string(),
        page_number,
    }
}

/// Object store that knows a fixed set of keys and records every request.
pub struct FakeObjectStore {
    keys: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl FakeObjectStore {
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(ToString::to_string).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Keys passed to `download`, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn download(&self, file_key: &str) -> anyhow::Result<PathBuf> {
        self.requested.lock().unwrap().push(file_key.to_string());
        anyhow::ensure!(self.keys.contains(file_key), "no such object: {file_key}");
        Ok(PathBuf::from("/fake").join(file_key))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Extractor returning canned pages for any path.
pub struct FakeExtractor {
    pages: Option<Vec<Page>>,
}

impl FakeExtractor {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages: Some(pages) }
    }

    /// An extractor that rejects every document.
    pub fn failing() -> Self {
        Self { pages: None }
    }
}

#[async_trait]
impl PageExtractor for FakeExtractor {
    async fn extract(&self, path: &Path) -> anyhow::Result<Vec<Page>> {
        self.pages
            .clone()
            .ok_or_else(|| anyhow::anyhow!("unreadable document {}", path.display()))
    }
}

/// Deterministic embedder: one dimension per keyword holding its occurrence
/// count, plus a trailing dimension set only when no keyword occurs, so no
/// vector is ever zero.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail any text containing `needle`.
    #[must_use]
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|keyword| lower.matches(keyword.as_str()).count() as f32)
            .collect();
        let none = vector.iter().all(|v| *v == 0.0);
        vector.push(if none { 1.0 } else { 0.0 });
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(needle) = &self.fail_on {
            anyhow::ensure!(!text.contains(needle.as_str()), "embedding refused");
        }
        Ok(self.vector_for(text))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Vector index kept in memory. Counts upserts, can serve canned matches,
/// and can be made to fail every call.
#[derive(Default)]
pub struct MemoryIndex {
    records: Mutex<Vec<(String, IndexRecord)>>,
    canned: Option<Vec<MatchResult>>,
    failing: bool,
    upserts: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query returns `matches` unchanged.
    pub fn with_matches(matches: Vec<MatchResult>) -> Self {
        Self {
            canned: Some(matches),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of upsert calls, including failed ones.
    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Records of `namespace` in first-insertion order.
    pub fn records(&self, namespace: &str) -> Vec<IndexRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> anyhow::Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        anyhow::ensure!(!self.failing, "index unavailable");
        let mut stored = self.records.lock().unwrap();
        for record in records {
            match stored
                .iter_mut()
                .find(|(ns, existing)| ns == namespace && existing.id == record.id)
            {
                Some((_, existing)) => *existing = record.clone(),
                None => stored.push((namespace.to_string(), record.clone())),
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> anyhow::Result<Vec<MatchResult>> {
        anyhow::ensure!(!self.failing, "index unavailable");
        if let Some(canned) = &self.canned {
            return Ok(canned.clone());
        }
        let mut matches: Vec<MatchResult> = self
            .records(namespace)
            .into_iter()
            .map(|record| MatchResult {
                score: Some(f64::from(cosine_similarity(vector, &record.values))),
                id: record.id,
                metadata: include_metadata.then_some(record.metadata),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .unwrap_or_default()
                .total_cmp(&a.score.unwrap_or_default())
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
