//! SQLite snapshot of the evidence corpus
//!
//! The exclusive maintenance path writes records here; query processes load a
//! catalog from it once and never write while serving.
//!
//! # Examples
//!
//! ```no_run
//! use fair_store::{HashingEmbeddingModel, SqliteEvidenceStore};
//! use fair_store::corpus::{curated_records, CorpusImporter};
//!
//! let model = HashingEmbeddingModel::default();
//! let mut records = curated_records();
//! CorpusImporter::new(&model).embed_missing(&mut records).unwrap();
//!
//! let mut store = SqliteEvidenceStore::open("evidence.db").unwrap();
//! store.save_records(&records).unwrap();
//! let build = store.load_catalog(384).unwrap();
//! assert!(build.skipped.is_empty());
//! ```

use crate::catalog::{CatalogBuild, EvidenceCatalog, SkippedItem};
use crate::corpus::CorpusRecord;
use crate::StoreError;
use chrono::NaiveDate;
use fair_domain::{SourceOrigin, SourceType};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// SQLite-backed corpus snapshot
///
/// SQLite connections are not thread-safe; load a catalog and share that
/// instead of sharing the store.
pub struct SqliteEvidenceStore {
    conn: Connection,
}

/// Row as read from the database, before validation
struct RawRow {
    id: String,
    title: String,
    content: String,
    domain: Option<String>,
    reliability: Option<f64>,
    publication_date: Option<String>,
    source_type: String,
    origin: String,
    url: Option<String>,
    keywords: String,
    embedding: Option<Vec<u8>>,
}

impl SqliteEvidenceStore {
    /// Open (or create) a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory store, for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Insert or replace one record
    pub fn insert_record(&self, record: &CorpusRecord) -> Result<(), StoreError> {
        insert(&self.conn, record)
    }

    /// Insert or replace records in one transaction
    pub fn save_records(&mut self, records: &[CorpusRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        for record in records {
            insert(&tx, record)?;
        }
        tx.commit()?;
        info!(records = records.len(), "Saved corpus records");
        Ok(records.len())
    }

    /// Write every item of a catalog
    pub fn save_catalog(&mut self, catalog: &EvidenceCatalog) -> Result<usize, StoreError> {
        let records: Vec<CorpusRecord> = catalog
            .items()
            .iter()
            .map(|item| CorpusRecord {
                id: item.id.to_string(),
                title: item.title.clone(),
                content: item.content.clone(),
                domain: Some(item.domain.as_str().to_string()),
                reliability: Some(item.reliability),
                publication_date: item.publication_date,
                source_type: item.source_type,
                origin: item.origin,
                url: item.url.clone(),
                keywords: item.keywords.iter().cloned().collect(),
                embedding: Some(item.embedding.clone()),
            })
            .collect();
        self.save_records(&records)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM evidence", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Read all records; rows that cannot be decoded are returned as skipped
    pub fn load_records(&self) -> Result<(Vec<CorpusRecord>, Vec<SkippedItem>), StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, domain, reliability, publication_date,
                    source_type, origin, url, keywords, embedding
             FROM evidence ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RawRow {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                domain: row.get(3)?,
                reliability: row.get(4)?,
                publication_date: row.get(5)?,
                source_type: row.get(6)?,
                origin: row.get(7)?,
                url: row.get(8)?,
                keywords: row.get(9)?,
                embedding: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for row in rows {
            match decode(row?) {
                Ok(record) => records.push(record),
                Err(skip) => skipped.push(skip),
            }
        }
        debug!(records = records.len(), undecodable = skipped.len(), "Loaded evidence rows");
        Ok((records, skipped))
    }

    /// Load a catalog; undecodable and malformed rows are skipped
    pub fn load_catalog(&self, dimension: usize) -> Result<CatalogBuild, StoreError> {
        let (records, mut undecodable) = self.load_records()?;
        let mut build = EvidenceCatalog::build(dimension, records);
        undecodable.append(&mut build.skipped);
        build.skipped = undecodable;
        Ok(build)
    }
}

fn insert(conn: &Connection, record: &CorpusRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO evidence
            (id, title, content, domain, reliability, publication_date,
             source_type, origin, url, keywords, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id,
            record.title,
            record.content,
            record.domain,
            record.reliability,
            record.publication_date.map(|d| d.format("%Y-%m-%d").to_string()),
            enum_to_text(&record.source_type)?,
            enum_to_text(&record.origin)?,
            record.url,
            serde_json::to_string(&record.keywords)?,
            record.embedding.as_deref().map(embedding_to_bytes),
        ],
    )?;
    Ok(())
}

fn decode(row: RawRow) -> Result<CorpusRecord, SkippedItem> {
    let skip = |reason: String| SkippedItem {
        id: row.id.clone(),
        reason,
    };

    let publication_date = row
        .publication_date
        .as_deref()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
        .transpose()
        .map_err(|e| skip(format!("invalid publication date: {e}")))?;
    let source_type: SourceType =
        text_to_enum(&row.source_type).map_err(|e| skip(format!("invalid source type: {e}")))?;
    let origin: SourceOrigin =
        text_to_enum(&row.origin).map_err(|e| skip(format!("invalid origin: {e}")))?;
    let keywords: Vec<String> = serde_json::from_str(&row.keywords)
        .map_err(|e| skip(format!("invalid keywords: {e}")))?;
    let embedding = row
        .embedding
        .as_deref()
        .map(bytes_to_embedding)
        .transpose()
        .map_err(skip)?;

    Ok(CorpusRecord {
        id: row.id,
        title: row.title,
        content: row.content,
        domain: row.domain,
        reliability: row.reliability,
        publication_date,
        source_type,
        origin,
        url: row.url,
        keywords,
        embedding,
    })
}

/// Encode an embedding as little-endian f32 bytes
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode little-endian f32 bytes
fn bytes_to_embedding(bytes: &[u8]) -> Result<Vec<f32>, String> {
    if bytes.len() % 4 != 0 {
        return Err(format!("embedding blob of {} bytes is not a multiple of 4", bytes.len()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Snake-case name of a unit enum variant
fn enum_to_text<T: Serialize>(value: &T) -> Result<String, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

fn text_to_enum<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
}
