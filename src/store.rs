use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Key holding the JSON array of tasks
pub const TASKS_KEY: &str = "tasks";
/// Key holding the JSON settings object
pub const SETTINGS_KEY: &str = "settings";
/// Key holding the JSON user profile object
pub const USER_KEY: &str = "user";
/// Key holding the newest-first JSON notification history
pub const NOTIFICATIONS_KEY: &str = "notifications";
/// Presence flag for the login gate
pub const SESSION_KEY: &str = "session";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create store directory: {0}")]
    DirectoryError(String),
    #[error("Failed to serialize value for '{key}': {source}")]
    SerializeError {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous key-value string store scoped to one user profile.
///
/// Mirrors a browser origin's local storage: string keys, string values,
/// no transactions. All methods take `&self`; implementations use interior
/// mutability so several services can share one store through an `Rc`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Wipe every key
    fn clear(&self) -> Result<(), StoreError>;
}

/// Read `key` and decode it as JSON.
///
/// Missing keys and unparsable values both come back as `None`; the latter is
/// logged so a corrupted record degrades to defaults instead of failing.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("event=store_parse_failed key={} error={}", key, e);
            Ok(None)
        }
    }
}

/// Encode `value` as JSON and write it under `key`
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::SerializeError {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)?;
    log::debug!("event=store_write key={} bytes={}", key, raw.len());
    Ok(())
}

/// File-backed store: a single `kv` table in a SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let store = SqliteStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![
                key,
                value,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM kv", [])?;
        tx.commit()?;
        Ok(())
    }
}

/// In-process store used for tests and `--ephemeral` sessions.
///
/// Counts writes so callers can assert that a no-op did not persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`, `remove` and `clear` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn bump(&self) {
        self.writes.set(self.writes.get() + 1);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.bump();
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.bump();
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.bump();
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
