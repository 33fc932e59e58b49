//! In-memory document index.
//!
//! Useful for tests and for short-lived CLI sessions.

use super::{rank, split_into_chunks, DocumentIndex, Embedder, IndexedChunk, Passage, RetrievalConfig};
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub struct MemoryDocumentIndex {
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
    chunks: RwLock<Vec<IndexedChunk>>,
}

impl MemoryDocumentIndex {
    pub fn new(embedder: Arc<dyn Embedder>, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            config,
            chunks: RwLock::new(Vec::new()),
        }
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> TutorlyError {
        TutorlyError::Rag(format!("Document index lock poisoned: {}", e))
    }
}

#[async_trait]
impl DocumentIndex for MemoryDocumentIndex {
    async fn has_indexed_documents(&self, chat_id: &str) -> Result<bool> {
        let chunks = self.chunks.read().map_err(Self::lock_error)?;
        Ok(chunks.iter().any(|c| c.chat_id == chat_id))
    }

    async fn retrieve_docs(&self, query: &str, chat_id: &str) -> Result<Vec<Passage>> {
        let query_embedding = self.embedder.embed(query).await?;
        let chunks = self.chunks.read().map_err(Self::lock_error)?;
        Ok(rank(
            &query_embedding,
            chunks.iter().filter(|c| c.chat_id == chat_id),
            &self.config,
        ))
    }

    async fn index_document(&self, chat_id: &str, source: &str, text: &str) -> Result<usize> {
        let pieces = split_into_chunks(text, self.config.chunk_words, self.config.chunk_overlap);
        if pieces.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&pieces).await?;
        let new_chunks: Vec<IndexedChunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (content, embedding))| IndexedChunk {
                chat_id: chat_id.to_string(),
                source: source.to_string(),
                content,
                chunk_order: order,
                embedding,
            })
            .collect();

        let count = new_chunks.len();
        let mut chunks = self.chunks.write().map_err(Self::lock_error)?;
        chunks.retain(|c| !(c.chat_id == chat_id && c.source == source));
        chunks.extend(new_chunks);

        debug!("Indexed {} chunks of {} for chat {}", count, source, chat_id);
        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Embeds text as letter frequencies over a-z.
    pub(crate) struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            26
        }
    }

    fn index() -> MemoryDocumentIndex {
        let config = RetrievalConfig {
            chunk_words: 3,
            chunk_overlap: 0,
            top_k: 2,
            min_score: 0.0,
        };
        MemoryDocumentIndex::new(Arc::new(LetterEmbedder), config)
    }

    #[tokio::test]
    async fn test_index_and_retrieve_per_chat() {
        let index = index();
        assert!(!index.has_indexed_documents("c1").await.unwrap());

        let stored = index
            .index_document("c1", "notes.txt", "aaa aaa aaa zzz zzz zzz")
            .await
            .unwrap();
        assert_eq!(stored, 2);
        assert!(index.has_indexed_documents("c1").await.unwrap());
        assert!(!index.has_indexed_documents("c2").await.unwrap());

        let passages = index.retrieve_docs("zz", "c1").await.unwrap();
        assert_eq!(passages[0].content, "zzz zzz zzz");
        assert!(index.retrieve_docs("zz", "c2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reindexing_replaces_source() {
        let index = index();
        index.index_document("c1", "a.txt", "one two three four").await.unwrap();
        let stored = index.index_document("c1", "a.txt", "five").await.unwrap();
        assert_eq!(stored, 1);
        let passages = index.retrieve_docs("five", "c1").await.unwrap();
        assert_eq!(passages.len(), 1);
    }
}
