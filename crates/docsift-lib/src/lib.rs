pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod namespace;
pub mod output;
pub mod pipeline;
pub mod runtime;
pub mod settings;
pub mod storage;
pub mod text;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use error::PipelineError;
pub use namespace::derive_namespace;
pub use pipeline::ingest::ingest_document;
pub use pipeline::retrieve::retrieve_context;
pub use runtime::Runtime;
