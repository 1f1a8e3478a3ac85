//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::DataMap;
use crate::domain::traits::{StateStore, StoreKey};

/// Records kept in process memory; lost on restart
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<StoreKey, DataMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &StoreKey) -> Result<DataMap, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))?;
        Ok(records.get(key).cloned().unwrap_or_default())
    }

    fn save(&self, key: &StoreKey, data: &DataMap) -> Result<(), StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))?;
        records.insert(key.clone(), data.clone());
        Ok(())
    }
}
