//! OpenAI-compatible embeddings client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::EmbeddingProvider;

/// Async embeddings client for `POST {base_url}/embeddings`.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_attempts: usize,
}

impl OpenAiEmbedder {
    /// Build a client. `max_attempts` of 1 means a single request with no
    /// retry.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
        max_attempts: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing OpenAI API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing OpenAI model name");
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid OpenAI API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build OpenAI HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    async fn request_once(&self, text: &str) -> Result<Vec<f32>, Attempt> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let response = match self.client.post(&self.endpoint).json(&request).send().await {
            Ok(resp) => resp,
            Err(err) => {
                let retryable = err.is_timeout() || err.is_connect() || err.is_request();
                return Err(Attempt {
                    error: anyhow::Error::new(err).context("OpenAI embeddings request failed"),
                    retryable,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Attempt {
                error: anyhow::anyhow!("OpenAI embeddings request failed ({status}): {body}"),
                retryable: should_retry(status),
            });
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|err| Attempt {
            error: anyhow::Error::new(err).context("failed to parse OpenAI embedding response"),
            retryable: false,
        })?;
        parsed.into_single().map_err(|error| Attempt {
            error,
            retryable: false,
        })
    }
}

struct Attempt {
    error: anyhow::Error,
    retryable: bool,
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[allow(clippy::cast_possible_truncation)]
fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut attempt = 0usize;
        loop {
            match self.request_once(text).await {
                Ok(embedding) => {
                    debug!(
                        text_len = text.len(),
                        dimension = embedding.len(),
                        "Embedded text"
                    );
                    return Ok(embedding);
                }
                Err(failed) if failed.retryable && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    warn!(attempt, error = %failed.error, "Retrying embedding request");
                    tokio::time::sleep(retry_backoff(attempt)).await;
                }
                Err(failed) => return Err(failed.error),
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_single(self) -> anyhow::Result<Vec<f32>> {
        let count = self.data.len();
        anyhow::ensure!(count == 1, "OpenAI returned {count} embeddings for 1 input");
        self.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow::anyhow!("OpenAI response missing embedding"))
    }
}
