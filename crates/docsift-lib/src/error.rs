use thiserror::Error;

/// Failure of an ingestion or retrieval pipeline run.
///
/// Each variant corresponds to one collaborator call site. All of them are
/// fatal to the pipeline call that raised them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not download `{file_key}` from object storage")]
    Download {
        file_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not extract pages from `{file_key}`")]
    Extraction {
        file_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("page preparation task failed for `{file_key}`")]
    Preparation {
        file_key: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("could not embed text for `{file_key}`")]
    Embedding {
        file_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not upsert {count} records into namespace `{namespace}`")]
    IndexWrite {
        namespace: String,
        count: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not query namespace `{namespace}`")]
    IndexQuery {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },
}
