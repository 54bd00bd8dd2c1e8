//! Record store seam
//!
//! The importer only needs an ordered-insert API that can fail per call.
//! Adapters:
//! - `RestStore`: PostgREST-style table endpoint over HTTP
//! - `SqliteStore`: local SQLite database
//! - `MemoryStore`: in-process, for dry runs and tests

pub mod memory;
pub mod rest;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::import::{CanonicalRecord, Category, format_date};

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use sqlite::SqliteStore;

/// Record shape persisted to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub title: String,
    /// `yyyy-MM-dd`
    pub date: String,
    pub category: Category,
    pub description: Option<String>,
    pub owner_id: String,
}

impl StoredRecord {
    /// Stamp a canonical record with the acting user
    pub fn from_record(record: &CanonicalRecord, owner_id: &str) -> Self {
        Self {
            title: record.title.clone(),
            date: format_date(record.date),
            category: record.category,
            description: if record.description.is_empty() {
                None
            } else {
                Some(record.description.clone())
            },
            owner_id: owner_id.to_string(),
        }
    }
}

/// Error from a single store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store answered with a non-success status
    Http { status: u16, message: String },
    /// The request never got a response
    Transport(String),
    /// Local database failure
    Database(String),
    /// The store refused the batch (constraint violation etc.)
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Http { status, message } => {
                write!(f, "HTTP {}: {}", status, message)
            }
            StoreError::Transport(msg) => write!(f, "request failed: {}", msg),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
            StoreError::Rejected(msg) => write!(f, "rejected: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Ordered-insert API the batch importer writes to
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one batch in a single call
    async fn insert_batch(&self, records: &[StoredRecord]) -> Result<(), StoreError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
