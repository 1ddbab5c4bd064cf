use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use docsift_lib::config::{
    DEFAULT_EMBEDDING_CONCURRENCY, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};
use docsift_lib::pipeline::chunker::ChunkingConfig;
use docsift_lib::settings::{
    EmbedderSettings, IndexSettings, Settings, StoreSettings, default_download_dir,
    default_index_path, default_model_dir,
};

#[derive(Parser, Debug)]
#[command(
    name = "docsift",
    about = "Index PDF documents into a vector store and retrieve relevant context"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download, split, embed and index a document.
    Ingest {
        /// Object key of the document.
        file_key: String,
    },

    /// Print the context assembled for a question about an indexed document.
    Query {
        /// Object key the document was ingested under.
        file_key: String,
        /// Free-text question.
        text: String,
    },

    /// Print the index namespace a file key maps to.
    Namespace { file_key: String },

    /// Manage the local embedding model.
    Model {
        #[command(subcommand)]
        model_command: ModelCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// Download the embedding model files from Hugging Face.
    Download {
        /// Force re-download even if files already exist.
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    Openai,
    Local,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Sqlite,
    Pinecone,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Backend selection and tuning, shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory that file keys are resolved against.
    #[arg(long, env = "DOCSIFT_STORE_DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Base URL that file keys are appended to. Takes precedence over
    /// `--store-dir`.
    #[arg(long, env = "DOCSIFT_STORE_URL", global = true)]
    pub store_url: Option<String>,

    /// Where documents fetched from `--store-url` are written.
    #[arg(long, env = "DOCSIFT_DOWNLOAD_DIR", global = true)]
    pub download_dir: Option<PathBuf>,

    #[arg(long, env = "DOCSIFT_EMBEDDER", value_enum, default_value_t = EmbedderKind::Openai, global = true)]
    pub embedder: EmbedderKind,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "DOCSIFT_OPENAI_BASE", default_value = DEFAULT_OPENAI_BASE_URL, global = true)]
    pub openai_base_url: String,

    #[arg(long, env = "DOCSIFT_OPENAI_MODEL", default_value = DEFAULT_OPENAI_MODEL, global = true)]
    pub openai_model: String,

    /// Timeout for each HTTP request made to the store, embedder or index.
    #[arg(long, default_value_t = 30, global = true)]
    pub embed_timeout_secs: u64,

    /// Extra attempts for throttled or failed embedding requests.
    #[arg(long, default_value_t = 0, global = true)]
    pub embed_max_retries: usize,

    /// Embedding requests kept in flight during ingestion.
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_CONCURRENCY, global = true)]
    pub embed_concurrency: usize,

    /// Directory holding the local embedding model.
    #[arg(long, env = "DOCSIFT_MODEL_DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    #[arg(long, env = "DOCSIFT_INDEX", value_enum, default_value_t = IndexKind::Sqlite, global = true)]
    pub index: IndexKind,

    /// SQLite index file.
    #[arg(long, env = "DOCSIFT_INDEX_PATH", global = true)]
    pub index_path: Option<PathBuf>,

    #[arg(long, env = "PINECONE_HOST", global = true)]
    pub pinecone_host: Option<String>,

    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true, global = true)]
    pub pinecone_api_key: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    pub fn model_dir(&self) -> PathBuf {
        self.model_dir.clone().unwrap_or_else(default_model_dir)
    }

    /// Resolve the flags into library settings, checking that the selected
    /// backends have their credentials.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let store = match &self.store_url {
            Some(base_url) => StoreSettings::Http {
                base_url: base_url.clone(),
                download_dir: self
                    .download_dir
                    .clone()
                    .unwrap_or_else(default_download_dir),
            },
            None => StoreSettings::Local {
                root: self
                    .store_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
        };

        let embedder = match self.embedder {
            EmbedderKind::Openai => EmbedderSettings::OpenAi {
                api_key: self
                    .openai_api_key
                    .clone()
                    .context("OpenAI API key required: pass --openai-api-key or set OPENAI_API_KEY")?,
                base_url: self.openai_base_url.clone(),
                model: self.openai_model.clone(),
                max_attempts: self.embed_max_retries + 1,
            },
            EmbedderKind::Local => EmbedderSettings::Local {
                model_dir: self.model_dir(),
            },
        };

        let index = match self.index {
            IndexKind::Sqlite => IndexSettings::Sqlite {
                path: self.index_path.clone().unwrap_or_else(default_index_path),
            },
            IndexKind::Pinecone => IndexSettings::Pinecone {
                api_key: self
                    .pinecone_api_key
                    .clone()
                    .context("Pinecone API key required: pass --pinecone-api-key or set PINECONE_API_KEY")?,
                host: self
                    .pinecone_host
                    .clone()
                    .context("Pinecone index host required: pass --pinecone-host or set PINECONE_HOST")?,
            },
        };

        Ok(Settings {
            store,
            embedder,
            index,
            chunking: ChunkingConfig::default(),
            embedding_concurrency: self.embed_concurrency,
            http_timeout: Duration::from_secs(self.embed_timeout_secs),
        })
    }
}
