//! Local SQLite record store

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use super::{RecordStore, StoreError, StoredRecord};

const CREATE_EVENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL CHECK (length(trim(title)) > 0),
        date TEXT NOT NULL,
        category TEXT NOT NULL CHECK (category IN ('meeting', 'task', 'reminder')),
        description TEXT,
        owner_id TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// SQLite-backed store; each batch is one transaction
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    label: String,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the schema
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .create_if_missing(true);

        // A single connection keeps `sqlite::memory:` databases shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self {
            pool,
            label: url.to_string(),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_EVENTS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_batch(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO events (id, title, date, category, description, owner_id)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.title)
            .bind(&record.date)
            .bind(record.category.as_str())
            .bind(&record.description)
            .bind(&record.owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        }

        // Dropping the transaction on error rolls the whole batch back
        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::Category;
    use sqlx::Row;

    impl SqliteStore {
        async fn count(&self) -> Result<i64, StoreError> {
            let row = sqlx::query("SELECT COUNT(*) AS n FROM events")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
            row.try_get("n")
                .map_err(|e| StoreError::Database(e.to_string()))
        }

        /// Stored titles in insertion order
        async fn titles(&self) -> Result<Vec<String>, StoreError> {
            let rows = sqlx::query("SELECT title FROM events ORDER BY rowid")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

            rows.iter()
                .map(|r| r.try_get("title"))
                .collect::<Result<Vec<String>, _>>()
                .map_err(|e| StoreError::Database(e.to_string()))
        }
    }

    fn stored(title: &str) -> StoredRecord {
        StoredRecord {
            title: title.to_string(),
            date: "2026-02-15".to_string(),
            category: Category::Meeting,
            description: None,
            owner_id: "owner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_batch() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store
            .insert_batch(&[stored("a"), stored("b")])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.titles().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        // Blank title violates the CHECK constraint on the second row
        let result = store.insert_batch(&[stored("ok"), stored("  ")]).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
