/// Maximum UTF-8 byte length of the page text stored as record metadata.
///
/// Keeps each record's metadata under the vector index's per-record
/// metadata limit (40 KB for Pinecone).
pub const METADATA_TEXT_MAX_BYTES: usize = 36_000;

/// Number of nearest neighbours requested from the vector index per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Matches must score strictly above this similarity to contribute context.
pub const MIN_MATCH_SCORE: f64 = 0.7;

/// Maximum length of the assembled context, in characters.
pub const CONTEXT_MAX_CHARS: usize = 3000;

/// Default chunk capacity for the text splitter, in characters.
pub const DEFAULT_CHUNK_CAPACITY: usize = 1000;

/// Default overlap between adjacent chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Maximum number of in-flight embedding requests during ingestion.
pub const DEFAULT_EMBEDDING_CONCURRENCY: usize = 32;

/// Pinecone accepts at most this many vectors per upsert request.
pub const PINECONE_UPSERT_BATCH: usize = 100;

/// Default OpenAI embedding model.
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-ada-002";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Subdirectory name under the model dir for GTE multilingual base files.
pub const LOCAL_MODEL_SUBDIR: &str = "gte-multilingual-base";

/// Embedding dimension of the local GTE multilingual base model.
pub const LOCAL_EMBEDDING_DIMENSION: usize = 768;
