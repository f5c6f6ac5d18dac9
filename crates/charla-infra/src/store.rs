//! Embedded document store.
//!
//! Opened once at startup. The main flow only ever reads all documents;
//! nothing in either session loop writes here.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use charla_types::error::StoreError;

/// One stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub body: String,
}

/// SQLite-backed document store.
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Open (creating if missing) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Fetch every stored document in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, body FROM documents ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, body)| Document { id, body })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_database_and_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(&dir.path().join("test.db"))
            .await
            .unwrap();
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_returns_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(&dir.path().join("test.db"))
            .await
            .unwrap();

        for body in ["first", "second"] {
            sqlx::query("INSERT INTO documents (body) VALUES (?)")
                .bind(body)
                .execute(&store.pool)
                .await
                .unwrap();
        }

        let documents = store.fetch_all().await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].body, "first");
        assert_eq!(documents[1].body, "second");
    }

    #[tokio::test]
    async fn test_reopen_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = DocumentStore::open(&path).await.unwrap();
            sqlx::query("INSERT INTO documents (body) VALUES ('kept')")
                .execute(&store.pool)
                .await
                .unwrap();
        }

        let store = DocumentStore::open(&path).await.unwrap();
        let documents = store.fetch_all().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].body, "kept");
    }
}
