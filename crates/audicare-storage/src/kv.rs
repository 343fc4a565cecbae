//! String key-value stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;

use audicare_core::error::AudiCareError;

use crate::db::Database;

/// Minimal persistent string map.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AudiCareError>;

    /// Insert or overwrite.
    fn set(&self, key: &str, value: &str) -> Result<(), AudiCareError>;

    fn has(&self, key: &str) -> Result<bool, AudiCareError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Store backed by the `kv` table.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    db: Arc<Database>,
}

impl SqliteKvStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, AudiCareError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AudiCareError::Storage(format!("Failed to read key: {}", e)))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AudiCareError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = strftime('%s', 'now')",
                rusqlite::params![key, value],
            )
            .map_err(|e| AudiCareError::Storage(format!("Failed to write key: {}", e)))?;
            Ok(())
        })
    }

    fn has(&self, key: &str) -> Result<bool, AudiCareError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM kv WHERE key = ?1)",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .map_err(|e| AudiCareError::Storage(format!("Failed to check key: {}", e)))
        })
    }
}

/// Volatile store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AudiCareError> {
        self.entries
            .lock()
            .map_err(|e| AudiCareError::Storage(format!("Store lock poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, AudiCareError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AudiCareError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_store() -> SqliteKvStore {
        SqliteKvStore::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(!store.has("missing").unwrap());

        store.set("user:ann", "secret").unwrap();
        assert_eq!(store.get("user:ann").unwrap().as_deref(), Some("secret"));
        assert!(store.has("user:ann").unwrap());

        store.set("user:ann", "changed").unwrap();
        assert_eq!(store.get("user:ann").unwrap().as_deref(), Some("changed"));
    }

    #[test]
    fn test_sqlite_store() {
        exercise(&sqlite_store());
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryKvStore::new());
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");
        {
            let store = SqliteKvStore::new(Arc::new(Database::new(&path).unwrap()));
            store.set("greeting", "hello").unwrap();
        }
        let store = SqliteKvStore::new(Arc::new(Database::new(&path).unwrap()));
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let store = sqlite_store();
        store.set("blank", "").unwrap();
        assert!(store.has("blank").unwrap());
        assert_eq!(store.get("blank").unwrap().as_deref(), Some(""));
    }
}
