use tracing::{debug, error, info};

use crate::config::{CONTEXT_MAX_CHARS, DEFAULT_TOP_K, MIN_MATCH_SCORE};
use crate::error::PipelineError;
use crate::index::MatchResult;
use crate::namespace::derive_namespace;
use crate::runtime::Runtime;
use crate::text::truncate_chars;

/// Whether a match is relevant enough to enter the context.
///
/// The threshold is strict and matches without a score never qualify.
pub fn is_relevant(m: &MatchResult) -> bool {
    m.score.is_some_and(|score| score > MIN_MATCH_SCORE)
}

/// Join the texts of the relevant matches with `\n`, in the order given,
/// and cut the result to [`CONTEXT_MAX_CHARS`] characters.
pub fn assemble_context(matches: &[MatchResult]) -> String {
    let joined = matches
        .iter()
        .filter(|m| is_relevant(m))
        .filter_map(|m| m.metadata.as_ref().map(|meta| meta.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_chars(&joined, CONTEXT_MAX_CHARS).to_string()
}

/// Build a context string for `query` from the document indexed under
/// `file_key`.
///
/// An empty string means nothing scored above the threshold.
pub async fn retrieve_context(
    runtime: &Runtime,
    query: &str,
    file_key: &str,
) -> Result<String, PipelineError> {
    let vector = runtime.embedder.embed(query).await.map_err(|source| {
        error!(file_key, error = %source, "Query embedding failed");
        PipelineError::Embedding {
            file_key: file_key.to_string(),
            source,
        }
    })?;

    let namespace = derive_namespace(file_key);
    let matches = runtime
        .index
        .query(&namespace, &vector, DEFAULT_TOP_K, true)
        .await
        .map_err(|source| {
            error!(file_key, %namespace, error = %source, "Index query failed");
            PipelineError::IndexQuery {
                namespace: namespace.clone(),
                source,
            }
        })?;
    debug!(%namespace, match_count = matches.len(), "Queried index");

    let context = assemble_context(&matches);
    info!(
        %namespace,
        relevant = matches.iter().filter(|m| is_relevant(m)).count(),
        context_chars = context.chars().count(),
        "Retrieved context"
    );
    Ok(context)
}
