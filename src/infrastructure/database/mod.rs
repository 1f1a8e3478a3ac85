//! SQLite-backed record store

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::application::errors::StorageError;
use crate::domain::entities::DataMap;
use crate::domain::traits::{StateStore, StoreKey};

/// One JSON document per store key
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                scope TEXT NOT NULL,
                channel TEXT NOT NULL,
                user_id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (scope, channel, user_id)
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))
    }

    /// When `key` was last saved, RFC 3339
    pub fn updated_at(&self, key: &StoreKey) -> Result<Option<String>, StorageError> {
        let (scope, channel, user_id) = key_columns(key);
        let conn = self.conn()?;
        let updated_at = conn
            .query_row(
                "SELECT updated_at FROM records
                 WHERE scope = ?1 AND channel = ?2 AND user_id = ?3",
                rusqlite::params![scope, channel, user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated_at)
    }
}

/// Key parts kept in separate columns so ids containing ':' never collide
fn key_columns(key: &StoreKey) -> (&str, &str, &str) {
    match key {
        StoreKey::Project => ("project", "", ""),
        StoreKey::User { channel, user_id } => ("user", channel.as_str(), user_id.as_str()),
    }
}

impl StateStore for SqliteStore {
    fn load(&self, key: &StoreKey) -> Result<DataMap, StorageError> {
        let (scope, channel, user_id) = key_columns(key);
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT data FROM records
                 WHERE scope = ?1 AND channel = ?2 AND user_id = ?3",
                rusqlite::params![scope, channel, user_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(DataMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Object(data)) => Ok(data),
            Ok(other) => Err(StorageError::Serialization(format!(
                "record {} is not an object: {}",
                key, other
            ))),
            Err(e) => Err(StorageError::Serialization(format!("record {}: {}", key, e))),
        }
    }

    fn save(&self, key: &StoreKey, data: &DataMap) -> Result<(), StorageError> {
        let raw = serde_json::to_string(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let conn = self.conn()?;
        let (scope, channel, user_id) = key_columns(key);
        conn.execute(
            "INSERT OR REPLACE INTO records (scope, channel, user_id, data, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![scope, channel, user_id, raw, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_keeps_key_order() {
        let store = SqliteStore::in_memory().unwrap();
        let key = StoreKey::user("telegram", "42");
        let mut data = DataMap::new();
        data.insert("zeta".to_string(), json!(1));
        data.insert("alpha".to_string(), json!({"nested": true}));

        store.save(&key, &data).unwrap();
        let loaded = store.load(&key).unwrap();

        assert_eq!(loaded, data);
        let keys: Vec<&String> = loaded.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert!(store.updated_at(&key).unwrap().is_some());
    }

    #[test]
    fn test_unknown_key_loads_empty() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load(&StoreKey::Project).unwrap().is_empty());
        assert_eq!(store.updated_at(&StoreKey::Project).unwrap(), None);
    }

    #[test]
    fn test_save_overwrites() {
        let store = SqliteStore::in_memory().unwrap();
        let mut data = DataMap::new();
        data.insert("v".to_string(), json!(1));
        store.save(&StoreKey::Project, &data).unwrap();
        data.insert("v".to_string(), json!(2));
        store.save(&StoreKey::Project, &data).unwrap();

        assert_eq!(store.load(&StoreKey::Project).unwrap()["v"], json!(2));
    }

    #[test]
    fn test_colon_in_ids_does_not_collide() {
        let store = SqliteStore::in_memory().unwrap();
        let mut data = DataMap::new();
        data.insert("_intent_id".to_string(), json!("credentials"));
        store.save(&StoreKey::user("slack", "T1:U2"), &data).unwrap();

        assert!(store.load(&StoreKey::user("slack:T1", "U2")).unwrap().is_empty());
        assert_eq!(store.load(&StoreKey::user("slack", "T1:U2")).unwrap(), data);
        assert_eq!(store.updated_at(&StoreKey::user("slack:T1", "U2")).unwrap(), None);
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        let key = StoreKey::user("slack", "u1");
        let mut data = DataMap::new();
        data.insert("_intent_id".to_string(), json!("credentials"));

        SqliteStore::new(&path).unwrap().save(&key, &data).unwrap();

        assert_eq!(SqliteStore::new(&path).unwrap().load(&key).unwrap(), data);
    }
}
