//! Pinecone data-plane client (REST).

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{IndexRecord, MatchResult, RecordMetadata, VectorIndex};
use crate::config::PINECONE_UPSERT_BATCH;

/// Client for one Pinecone index, addressed by its data-plane host.
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
}

impl PineconeIndex {
    /// Build a client for the index served at `host`
    /// (e.g. `https://chatpdf-online-abc123.svc.us-east-1.pinecone.io`).
    pub fn new(api_key: &str, host: &str, timeout: Duration) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Pinecone API key");
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            anyhow::ensure!(!host.trim().is_empty(), "missing Pinecone index host");
            format!("https://{}", host.trim_end_matches('/'))
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim()).context("invalid Pinecone API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Pinecone HTTP client")?;
        Ok(Self { client, host })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<reqwest::Response> {
        let url = format!("{}{path}", self.host);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Pinecone request to {path} failed"))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        anyhow::bail!("Pinecone {path} request failed ({status}): {body}");
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexRecord],
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    metadata: Option<WireMetadata>,
}

/// Pinecone returns numeric metadata as JSON floats.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    page_number: Option<f64>,
}

impl From<WireMatch> for MatchResult {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(wire: WireMatch) -> Self {
        let metadata = wire.metadata.and_then(|m| {
            Some(RecordMetadata {
                text: m.text?,
                page_number: m.page_number.unwrap_or(0.0) as u32,
            })
        });
        Self {
            id: wire.id,
            score: wire.score,
            metadata,
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> anyhow::Result<()> {
        for batch in records.chunks(PINECONE_UPSERT_BATCH) {
            self.post(
                "/vectors/upsert",
                &UpsertRequest {
                    vectors: batch,
                    namespace,
                },
            )
            .await?;
            debug!(namespace = %namespace, count = batch.len(), "Upserted Pinecone batch");
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
        let response = self
            .post(
                "/query",
                &QueryRequest {
                    namespace,
                    vector,
                    top_k,
                    include_metadata,
                    include_values: false,
                },
            )
            .await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .context("failed to parse Pinecone query response")?;
        debug!(
            namespace = %namespace,
            top_k,
            result_count = parsed.matches.len(),
            "Pinecone query completed"
        );
        Ok(parsed.matches.into_iter().map(MatchResult::from).collect())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
