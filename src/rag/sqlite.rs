//! SQLite-backed document index.
//!
//! Embeddings are stored as little-endian `f32` blobs and scored in Rust.

use super::{rank, split_into_chunks, DocumentIndex, Embedder, IndexedChunk, Passage, RetrievalConfig};
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS document_chunks (
        id TEXT PRIMARY KEY,
        chat_id TEXT NOT NULL,
        source TEXT NOT NULL,
        content TEXT NOT NULL,
        chunk_order INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_document_chunks_chat ON document_chunks(chat_id);
"#;

pub struct SqliteDocumentIndex {
    conn: Mutex<Connection>,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
}

impl SqliteDocumentIndex {
    /// Open (or create) the index at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path, embedder: Arc<dyn Embedder>, config: RetrievalConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized document index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            config,
        })
    }

    /// In-memory database (useful for testing).
    pub fn in_memory(embedder: Arc<dyn Embedder>, config: RetrievalConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            config,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TutorlyError::Rag(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn load_chunks(conn: &Connection, chat_id: &str) -> Result<Vec<IndexedChunk>> {
        let mut stmt = conn.prepare(
            "SELECT chat_id, source, content, chunk_order, embedding
             FROM document_chunks WHERE chat_id = ?1",
        )?;

        let rows = stmt.query_map(params![chat_id], |row| {
            let chunk_order: i64 = row.get(3)?;
            let embedding: Vec<u8> = row.get(4)?;
            Ok(IndexedChunk {
                chat_id: row.get(0)?,
                source: row.get(1)?,
                content: row.get(2)?,
                chunk_order: chunk_order.max(0) as usize,
                embedding: Self::bytes_to_embedding(&embedding),
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl DocumentIndex for SqliteDocumentIndex {
    async fn has_indexed_documents(&self, chat_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM document_chunks WHERE chat_id = ?1",
            params![chat_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    #[instrument(skip(self, query))]
    async fn retrieve_docs(&self, query: &str, chat_id: &str) -> Result<Vec<Passage>> {
        let query_embedding = self.embedder.embed(query).await?;
        let chunks = {
            let conn = self.lock()?;
            Self::load_chunks(&conn, chat_id)?
        };
        let passages = rank(&query_embedding, chunks.iter(), &self.config);
        debug!("Retrieved {} passages for chat {}", passages.len(), chat_id);
        Ok(passages)
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn index_document(&self, chat_id: &str, source: &str, text: &str) -> Result<usize> {
        let pieces = split_into_chunks(text, self.config.chunk_words, self.config.chunk_overlap);
        if pieces.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&pieces).await?;
        let indexed_at = Utc::now().to_rfc3339();

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM document_chunks WHERE chat_id = ?1 AND source = ?2",
            params![chat_id, source],
        )?;

        for (order, (content, embedding)) in pieces.iter().zip(embeddings.iter()).enumerate() {
            tx.execute(
                r#"
                INSERT INTO document_chunks
                (id, chat_id, source, content, chunk_order, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    Uuid::new_v4().to_string(),
                    chat_id,
                    source,
                    content,
                    order as i64,
                    Self::embedding_to_bytes(embedding),
                    indexed_at,
                ],
            )?;
        }

        tx.commit()?;
        info!("Indexed {} chunks of {} for chat {}", pieces.len(), source, chat_id);
        Ok(pieces.len())
    }
}
