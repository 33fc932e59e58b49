//! Chat-scoped document retrieval.
//!
//! Documents uploaded to a chat are split into overlapping word chunks,
//! embedded, and searched by cosine similarity.

mod embedding;
mod memory;
mod sqlite;

pub use embedding::{Embedder, OpenAIEmbedder};
pub use memory::MemoryDocumentIndex;
pub use sqlite::SqliteDocumentIndex;

#[cfg(test)]
pub(crate) use memory::tests::LetterEmbedder;

use crate::config::RagSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A retrieved passage with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Name of the document this passage came from.
    pub source: String,
    pub content: String,
    /// Position of the passage within its document.
    pub chunk_order: usize,
    pub score: f32,
}

/// A chunk as stored by an index.
#[derive(Debug, Clone)]
pub(crate) struct IndexedChunk {
    pub chat_id: String,
    pub source: String,
    pub content: String,
    pub chunk_order: usize,
    pub embedding: Vec<f32>,
}

/// Retrieval collaborator used by the context tool.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Whether any document has been indexed for this chat.
    async fn has_indexed_documents(&self, chat_id: &str) -> Result<bool>;

    /// Most relevant passages for `query`, best first.
    async fn retrieve_docs(&self, query: &str, chat_id: &str) -> Result<Vec<Passage>>;

    /// Split, embed and store a document. Returns the number of chunks stored.
    async fn index_document(&self, chat_id: &str, source: &str, text: &str) -> Result<usize>;
}

/// Chunking and ranking parameters shared by index implementations.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub chunk_words: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::from(&RagSettings::default())
    }
}

impl From<&RagSettings> for RetrievalConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            chunk_words: settings.chunk_words,
            chunk_overlap: settings.chunk_overlap,
            top_k: settings.top_k,
            min_score: settings.min_score,
        }
    }
}

/// Split text into chunks of `chunk_words` words, each sharing `overlap`
/// words with the previous one.
pub fn split_into_chunks(text: &str, chunk_words: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let size = chunk_words.max(1);
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score chunks against a query embedding and keep the best `top_k`.
pub(crate) fn rank<'a>(
    query_embedding: &[f32],
    chunks: impl Iterator<Item = &'a IndexedChunk>,
    config: &RetrievalConfig,
) -> Vec<Passage> {
    let mut passages: Vec<Passage> = chunks
        .map(|chunk| Passage {
            source: chunk.source.clone(),
            content: chunk.content.clone(),
            chunk_order: chunk.chunk_order,
            score: cosine_similarity(query_embedding, &chunk.embedding),
        })
        .filter(|p| p.score >= config.min_score)
        .collect();

    passages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    passages.truncate(config.top_k);
    passages
}

/// Format passages as a numbered context block for a prompt.
pub fn format_passages_for_prompt(passages: &[Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("---\n[{}] {} (part {})\n{}\n---", i + 1, p.source, p.chunk_order + 1, p.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[test]
    fn test_split_into_chunks_overlaps() {
        let text = "a b c d e f g";
        let chunks = split_into_chunks(text, 3, 1);
        assert_eq!(chunks, vec!["a b c", "c d e", "e f g"]);
    }

    #[test]
    fn test_split_short_text_is_one_chunk() {
        assert_eq!(split_into_chunks("just a few words", 200, 20), vec!["just a few words"]);
        assert!(split_into_chunks("   ", 10, 2).is_empty());
    }

    #[test]
    fn test_split_overlap_larger_than_chunk_still_advances() {
        let chunks = split_into_chunks("a b c d", 2, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.last().map(String::as_str), Some("c d"));
    }
}
