use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DEFAULT_EMBEDDING_CONCURRENCY, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::pipeline::chunker::ChunkingConfig;

/// Where documents are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    /// Keys are paths under a local directory.
    Local { root: PathBuf },
    /// Keys are appended to an HTTP(S) base URL and downloaded.
    Http {
        base_url: String,
        download_dir: PathBuf,
    },
}

/// Which embedding provider to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedderSettings {
    OpenAi {
        api_key: String,
        base_url: String,
        model: String,
        max_attempts: usize,
    },
    Local { model_dir: PathBuf },
}

/// Which vector index to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSettings {
    Sqlite { path: PathBuf },
    Pinecone { api_key: String, host: String },
}

/// Everything needed to build a [`crate::runtime::Runtime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreSettings,
    pub embedder: EmbedderSettings,
    pub index: IndexSettings,
    pub chunking: ChunkingConfig,
    pub embedding_concurrency: usize,
    /// Timeout applied to every HTTP request made by the backends.
    pub http_timeout: Duration,
}

/// Root of docsift's per-user data: `~/.docsift`.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".docsift")
}

/// Default SQLite index location.
pub fn default_index_path() -> PathBuf {
    data_dir().join("index.db")
}

/// Default local model cache.
pub fn default_model_dir() -> PathBuf {
    data_dir().join("models")
}

/// Default directory for documents fetched over HTTP.
pub fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("docsift-downloads")
}

impl Default for Settings {
    /// Local directory store rooted at the working directory, OpenAI
    /// embeddings (key from `OPENAI_API_KEY` left empty here), SQLite index.
    fn default() -> Self {
        Self {
            store: StoreSettings::Local {
                root: PathBuf::from("."),
            },
            embedder: EmbedderSettings::OpenAi {
                api_key: String::new(),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
                max_attempts: 1,
            },
            index: IndexSettings::Sqlite {
                path: default_index_path(),
            },
            chunking: ChunkingConfig::default(),
            embedding_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
            http_timeout: Duration::from_secs(30),
        }
    }
}
