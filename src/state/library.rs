use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::error::StoreError;
use super::store::KeyValueStore;

/// The Library is the on-disk key-value store backed by SQLite.
/// Each comment scope is one row holding its JSON list.
#[derive(Clone)]
pub struct Library {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the database file at `db_path`.
    ///
    /// The parent directory is created if missing.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;

        tracing::info!(path = %db_path.display(), "comment store opened");

        Ok(Library {
            conn: Arc::new(Mutex::new(conn)),
            db_path: db_path.to_path_buf(),
        })
    }

    /// In-memory database, same schema; nothing survives the process
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Library {
            conn: Arc::new(Mutex::new(conn)),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Creates the key-value table if it doesn't exist.
    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key         TEXT PRIMARY KEY NOT NULL,
                value       TEXT NOT NULL,
                updated_at  INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Number of stored keys
    pub async fn key_count(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }

    /// Run a query on the blocking pool; rusqlite calls must not stall the runtime
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }
}

#[async_trait]
impl KeyValueStore for Library {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value: Option<String> = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [&key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value, chrono::Utc::now().timestamp()],
            )?;
            Ok(())
        })
        .await
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let library = Library::open_in_memory().unwrap();

        assert_eq!(library.get("profile_comments").await.unwrap(), None);

        library.set("profile_comments", "[]").await.unwrap();
        library.set("profile_comments", "[1]").await.unwrap();

        assert_eq!(
            library.get("profile_comments").await.unwrap().as_deref(),
            Some("[1]")
        );
        assert_eq!(library.key_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("sightings.db");

        {
            let library = Library::open(&db_path).unwrap();
            library.set("comments_discover-2", r#"["panda"]"#).await.unwrap();
        }

        let reopened = Library::open(&db_path).unwrap();
        assert_eq!(reopened.path(), db_path.as_path());
        assert_eq!(
            reopened.get("comments_discover-2").await.unwrap().as_deref(),
            Some(r#"["panda"]"#)
        );
    }
}
