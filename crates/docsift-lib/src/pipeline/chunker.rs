use text_splitter::{ChunkConfig, TextSplitter};

use crate::config::{DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_OVERLAP, METADATA_TEXT_MAX_BYTES};
use crate::extract::Page;
use crate::index::RecordMetadata;
use crate::text::{strip_newlines, truncate_bytes};

/// Character-based splitting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub capacity: usize,
    /// Characters shared between adjacent chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHUNK_CAPACITY,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// A chunk ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChunk {
    /// The chunk's own span of the newline-stripped page text. This is what
    /// gets embedded and hashed.
    pub text: String,
    /// Stored alongside the vector. `metadata.text` is the whole page's
    /// newline-stripped text truncated to [`METADATA_TEXT_MAX_BYTES`], shared
    /// by every chunk cut from that page.
    pub metadata: RecordMetadata,
}

/// Split `text` into chunks of at most `config.capacity` characters.
///
/// An overlap that does not fit the capacity is clamped to `capacity - 1`.
pub fn split_text<'a>(text: &'a str, config: &ChunkingConfig) -> Vec<&'a str> {
    let capacity = config.capacity.max(1);
    let overlap = config.overlap.min(capacity - 1);
    let chunk_config = ChunkConfig::new(capacity)
        .with_overlap(overlap)
        .unwrap_or_else(|_| ChunkConfig::new(capacity));
    TextSplitter::new(chunk_config).chunks(text).collect()
}

/// Turn one extracted page into chunks.
///
/// Newlines are stripped first. The stripped text is split as a whole, while
/// the metadata text is the stripped text cut down to the byte limit.
pub fn prepare_page(page: &Page, config: &ChunkingConfig) -> Vec<PreparedChunk> {
    let content = strip_newlines(&page.text);
    let metadata = RecordMetadata {
        text: truncate_bytes(&content, METADATA_TEXT_MAX_BYTES).to_string(),
        page_number: page.page_number,
    };

    split_text(&content, config)
        .into_iter()
        .map(|chunk| PreparedChunk {
            text: chunk.to_string(),
            metadata: metadata.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str, page_number: u32) -> Page {
        Page {
            text: text.to_string(),
            page_number,
        }
    }

    #[test]
    fn short_page_is_a_single_chunk() {
        let chunks = prepare_page(&page("Short text on one page.", 1), &ChunkingConfig::default());
        assert_eq!(
            chunks,
            vec![PreparedChunk {
                text: "Short text on one page.".to_string(),
                metadata: RecordMetadata {
                    text: "Short text on one page.".to_string(),
                    page_number: 1,
                },
            }]
        );
    }

    #[test]
    fn newlines_are_stripped_before_splitting() {
        let chunks = prepare_page(&page("line one\nline two\n", 3), &ChunkingConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "line oneline two");
        assert_eq!(chunks[0].metadata.text, "line oneline two");
        assert_eq!(chunks[0].metadata.page_number, 3);
    }

    #[test]
    fn empty_page_has_no_chunks() {
        assert!(prepare_page(&page("", 1), &ChunkingConfig::default()).is_empty());
        assert!(prepare_page(&page("\n\n", 1), &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn long_page_splits_and_shares_page_metadata() {
        let text = "Words make sentences and sentences make pages. ".repeat(100);
        let chunks = prepare_page(&page(&text, 2), &ChunkingConfig::default());

        assert!(chunks.len() > 1, "expected several chunks, got {}", chunks.len());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= DEFAULT_CHUNK_CAPACITY);
            assert_eq!(chunk.metadata.text, text);
            assert_eq!(chunk.metadata.page_number, 2);
        }
    }

    #[test]
    fn metadata_text_is_truncated_but_chunks_cover_everything() {
        let text = "x".repeat(50_000);
        let chunks = prepare_page(&page(&text, 1), &ChunkingConfig::default());

        assert_eq!(chunks[0].metadata.text.len(), METADATA_TEXT_MAX_BYTES);
        let covered: usize = chunks.iter().map(|c| c.text.len()).sum();
        assert!(covered >= 50_000);
    }

    #[test]
    fn adjacent_chunks_overlap() {
        let text = (0..400).map(|i| format!("w{i} ")).collect::<String>();
        let config = ChunkingConfig {
            capacity: 100,
            overlap: 30,
        };
        let chunks = split_text(&text, &config);
        assert!(chunks.len() > 1);
        let first_tail = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].contains(first_tail));
    }

    #[test]
    fn oversized_overlap_is_clamped() {
        let config = ChunkingConfig {
            capacity: 10,
            overlap: 50,
        };
        let chunks = split_text("abcdefghij klmnopqrst uvwxyz", &config);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }
}
