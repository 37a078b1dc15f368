//! SQLite-based vector store implementation.
//!
//! Documents, their metadata and embeddings live in one table; cosine
//! similarity is computed in Rust. The dataset is a single club's players plus
//! a blog, so a full scan per query is fine.

use super::{rank, SearchResult, StoredDocument, VectorStore};
use crate::document::{Document, DocumentMeta};
use crate::error::{DuprError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        source TEXT NOT NULL,
        metadata_json TEXT NOT NULL,
        text TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);

    CREATE TABLE IF NOT EXISTS index_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

const FINGERPRINT_KEY: &str = "source_fingerprint";

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a SQLite vector store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DuprError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    /// Load every stored row.
    fn load_rows(conn: &Connection) -> Result<Vec<(Document, Vec<f32>)>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT metadata_json, text, embedding
            FROM documents
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let metadata_json: String = row.get(0)?;
            let text: String = row.get(1)?;
            let embedding_bytes: Vec<u8> = row.get(2)?;
            Ok((metadata_json, text, embedding_bytes))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (metadata_json, text, embedding_bytes) = row?;
            let metadata: DocumentMeta = serde_json::from_str(&metadata_json)?;
            result.push((
                Document { text, metadata },
                Self::bytes_to_embedding(&embedding_bytes),
            ));
        }
        Ok(result)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn add_documents(&self, docs: &[StoredDocument]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for row in docs {
            let metadata_json = serde_json::to_string(&row.document.metadata)?;
            tx.execute(
                r#"
                INSERT INTO documents (id, source, metadata_json, text, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    row.id.to_string(),
                    row.document.source().as_str(),
                    metadata_json,
                    row.document.text,
                    Self::embedding_to_bytes(&row.embedding),
                    row.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Inserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let rows = {
            let conn = self.lock()?;
            Self::load_rows(&conn)?
        };

        let results = rank(
            rows.iter().map(|(doc, emb)| (doc, emb.as_slice())),
            query_embedding,
            limit,
        );

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM documents", [])?;
        conn.execute("DELETE FROM index_meta WHERE key = ?1", params![FINGERPRINT_KEY])?;
        info!("Cleared {} documents from the index", deleted);
        Ok(())
    }

    async fn fingerprint(&self) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn set_fingerprint(&self, fingerprint: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
            params![FINGERPRINT_KEY, fingerprint],
        )?;
        Ok(())
    }
}

impl SqliteVectorStore {
    /// Timestamp of the most recent insert, if any.
    pub fn last_indexed_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        let latest: Option<String> =
            conn.query_row("SELECT MAX(indexed_at) FROM documents", [], |row| row.get(0))?;
        Ok(latest.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }))
    }
}
