//! PDF page extraction.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use lopdf::Document;
use tracing::debug;

/// Text of a single document page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub text: String,
    /// 1-based page number.
    pub page_number: u32,
}

/// Turns a local document file into ordered per-page text.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Extract every page in document order. Fails on unreadable documents.
    async fn extract(&self, path: &Path) -> anyhow::Result<Vec<Page>>;
}

/// PDF extractor built on `lopdf`.
#[derive(Debug, Default)]
pub struct PdfPageExtractor;

impl PdfPageExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageExtractor for PdfPageExtractor {
    async fn extract(&self, path: &Path) -> anyhow::Result<Vec<Page>> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || extract_pages(&path))
            .await
            .context("PDF extraction task panicked")?
    }
}

fn extract_pages(path: &Path) -> anyhow::Result<Vec<Page>> {
    let doc = Document::load(path)
        .with_context(|| format!("failed to load PDF {}", path.display()))?;

    // `get_pages` is keyed by 1-based page number in document order.
    let mut pages = Vec::new();
    for page_number in doc.get_pages().into_keys() {
        let text = doc
            .extract_text(&[page_number])
            .with_context(|| format!("failed to extract text of page {page_number}"))?;
        pages.push(Page { text, page_number });
    }

    debug!(
        path = %path.display(),
        page_count = pages.len(),
        "Extracted PDF pages"
    );
    Ok(pages)
}
