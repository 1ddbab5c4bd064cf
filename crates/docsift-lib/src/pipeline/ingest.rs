use futures::future::try_join_all;
use futures::{StreamExt, TryStreamExt, stream};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use crate::error::PipelineError;
use crate::extract::Page;
use crate::index::IndexRecord;
use crate::namespace::derive_namespace;
use crate::pipeline::chunker::{PreparedChunk, prepare_page};
use crate::runtime::Runtime;

/// Record id for a chunk: lowercase hex SHA-256 of its text.
pub fn chunk_id(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Download, split, embed and index the document stored under `file_key`.
///
/// All records land in the namespace derived from `file_key` through a single
/// upsert. Any collaborator failure aborts the run before that upsert, so a
/// failed ingestion never writes a partial document.
///
/// Returns the chunks prepared from the first page, or an empty list when
/// the document has no pages.
pub async fn ingest_document(
    runtime: &Runtime,
    file_key: &str,
) -> Result<Vec<PreparedChunk>, PipelineError> {
    let local_path = runtime.store.download(file_key).await.map_err(|source| {
        error!(file_key, error = %source, "Download failed");
        PipelineError::Download {
            file_key: file_key.to_string(),
            source,
        }
    })?;
    debug!(file_key, path = %local_path.display(), "Downloaded document");

    let pages = runtime
        .extractor
        .extract(&local_path)
        .await
        .map_err(|source| {
            error!(file_key, error = %source, "Page extraction failed");
            PipelineError::Extraction {
                file_key: file_key.to_string(),
                source,
            }
        })?;
    debug!(file_key, page_count = pages.len(), "Extracted pages");

    let per_page = prepare_pages(runtime, file_key, pages).await?;
    let chunks: Vec<&PreparedChunk> = per_page.iter().flatten().collect();
    debug!(file_key, chunk_count = chunks.len(), "Prepared chunks");

    let concurrency = runtime.options.embedding_concurrency.max(1);
    let embedder = &runtime.embedder;
    let vectors: Vec<Vec<f32>> =
        stream::iter(chunks.iter().map(|chunk| embedder.embed(&chunk.text)))
            .buffered(concurrency)
            .try_collect()
            .await
            .map_err(|source| {
                error!(file_key, error = %source, "Embedding failed");
                PipelineError::Embedding {
                    file_key: file_key.to_string(),
                    source,
                }
            })?;

    let records: Vec<IndexRecord> = chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, values)| IndexRecord {
            id: chunk_id(&chunk.text),
            values,
            metadata: chunk.metadata.clone(),
        })
        .collect();

    let namespace = derive_namespace(file_key);
    if records.is_empty() {
        debug!(file_key, %namespace, "No chunks to index");
    } else {
        runtime
            .index
            .upsert(&namespace, &records)
            .await
            .map_err(|source| {
                error!(
                    file_key,
                    %namespace,
                    count = records.len(),
                    error = %source,
                    "Index upsert failed"
                );
                PipelineError::IndexWrite {
                    namespace: namespace.clone(),
                    count: records.len(),
                    source,
                }
            })?;
    }

    info!(
        file_key,
        %namespace,
        pages = per_page.len(),
        records = records.len(),
        "Ingested document"
    );

    Ok(per_page.into_iter().next().unwrap_or_default())
}

/// Prepare every page on the blocking pool, one task per page, keeping page
/// order in the result.
async fn prepare_pages(
    runtime: &Runtime,
    file_key: &str,
    pages: Vec<Page>,
) -> Result<Vec<Vec<PreparedChunk>>, PipelineError> {
    let chunking = runtime.options.chunking;
    let tasks = pages.into_iter().map(|page| {
        tokio::task::spawn_blocking(move || prepare_page(&page, &chunking))
    });
    try_join_all(tasks).await.map_err(|source| {
        error!(file_key, error = %source, "Page preparation task failed");
        PipelineError::Preparation {
            file_key: file_key.to_string(),
            source,
        }
    })
}
