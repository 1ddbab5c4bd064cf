use std::sync::Arc;

use tracing::debug;

use crate::config::DEFAULT_EMBEDDING_CONCURRENCY;
use crate::embedding::EmbeddingProvider;
use crate::embedding::local::LocalEmbedder;
use crate::embedding::openai::OpenAiEmbedder;
use crate::extract::{PageExtractor, PdfPageExtractor};
use crate::index::VectorIndex;
use crate::index::pinecone::PineconeIndex;
use crate::index::sqlite::SqliteIndex;
use crate::pipeline::chunker::ChunkingConfig;
use crate::settings::{EmbedderSettings, IndexSettings, Settings, StoreSettings};
use crate::storage::{HttpObjectStore, LocalObjectStore, ObjectStore};

/// Tuning knobs for the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub chunking: ChunkingConfig,
    /// Maximum embedding requests in flight at once. Zero is treated as one.
    pub embedding_concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            embedding_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
        }
    }
}

/// The collaborators shared by both pipelines, built once per process and
/// passed in explicitly.
#[derive(Clone)]
pub struct Runtime {
    pub store: Arc<dyn ObjectStore>,
    pub extractor: Arc<dyn PageExtractor>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn VectorIndex>,
    pub options: IngestOptions,
}

impl Runtime {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        extractor: Arc<dyn PageExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            store,
            extractor,
            embedder,
            index,
            options: IngestOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    /// Build every collaborator described by `settings`.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn ObjectStore> = match &settings.store {
            StoreSettings::Local { root } => Arc::new(LocalObjectStore::new(root.clone())),
            StoreSettings::Http {
                base_url,
                download_dir,
            } => Arc::new(HttpObjectStore::new(
                base_url,
                download_dir.clone(),
                settings.http_timeout,
            )?),
        };

        let embedder: Arc<dyn EmbeddingProvider> = match &settings.embedder {
            EmbedderSettings::OpenAi {
                api_key,
                base_url,
                model,
                max_attempts,
            } => Arc::new(OpenAiEmbedder::new(
                api_key,
                base_url,
                model,
                settings.http_timeout,
                *max_attempts,
            )?),
            EmbedderSettings::Local { model_dir } => Arc::new(LocalEmbedder::new(model_dir)?),
        };

        let index: Arc<dyn VectorIndex> = match &settings.index {
            IndexSettings::Sqlite { path } => Arc::new(SqliteIndex::open(path)?),
            IndexSettings::Pinecone { api_key, host } => {
                Arc::new(PineconeIndex::new(api_key, host, settings.http_timeout)?)
            }
        };

        debug!(
            store = store.name(),
            embedder = embedder.name(),
            index = index.name(),
            "Built runtime"
        );

        Ok(Self::new(store, Arc::new(PdfPageExtractor::new()), embedder, index).with_options(
            IngestOptions {
                chunking: settings.chunking,
                embedding_concurrency: settings.embedding_concurrency,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn from_settings_builds_local_backends() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            store: StoreSettings::Local {
                root: tmp.path().to_path_buf(),
            },
            embedder: EmbedderSettings::OpenAi {
                api_key: "test-key".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
                model: "m".to_string(),
                max_attempts: 1,
            },
            index: IndexSettings::Sqlite {
                path: tmp.path().join("index.db"),
            },
            embedding_concurrency: 4,
            ..Settings::default()
        };

        let runtime = Runtime::from_settings(&settings).unwrap();

        assert_eq!(runtime.store.name(), "local-dir");
        assert_eq!(runtime.embedder.name(), "openai");
        assert_eq!(runtime.index.name(), "sqlite");
        assert_eq!(runtime.options.embedding_concurrency, 4);
        assert!(tmp.path().join("index.db").exists());
    }

    #[test]
    fn from_settings_requires_openai_key() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            index: IndexSettings::Sqlite {
                path: tmp.path().join("index.db"),
            },
            ..Settings::default()
        };
        let Err(err) = Runtime::from_settings(&settings) else {
            panic!("expected missing key error");
        };
        assert_eq!(err.to_string(), "missing OpenAI API key");
    }

    #[test]
    fn from_settings_builds_remote_backends() {
        let settings = Settings {
            store: StoreSettings::Http {
                base_url: "https://bucket.example.com".to_string(),
                download_dir: std::env::temp_dir(),
            },
            embedder: EmbedderSettings::OpenAi {
                api_key: "k".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "m".to_string(),
                max_attempts: 3,
            },
            index: IndexSettings::Pinecone {
                api_key: "k".to_string(),
                host: "idx.svc.pinecone.io".to_string(),
            },
            ..Settings::default()
        };

        let runtime = Runtime::from_settings(&settings).unwrap();

        assert_eq!(runtime.store.name(), "http");
        assert_eq!(runtime.index.name(), "pinecone");
    }
}
