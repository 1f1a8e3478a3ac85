use std::fmt;

use crate::application::errors::StorageError;
use crate::domain::entities::{DataMap, Event};

/// Which record a store operation addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Data shared by the whole bot project
    Project,
    /// Data of one user on one channel
    User { channel: String, user_id: String },
}

impl StoreKey {
    pub fn user(channel: impl Into<String>, user_id: impl Into<String>) -> Self {
        StoreKey::User {
            channel: channel.into(),
            user_id: user_id.into(),
        }
    }

    pub fn for_event(event: &Event) -> Self {
        Self::user(event.channel.clone(), event.sender.id.clone())
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKey::Project => write!(f, "project"),
            StoreKey::User { channel, user_id } => write!(f, "user:{}:{}", channel, user_id),
        }
    }
}

/// Store trait - abstraction for record persistence.
///
/// Loading a key that was never saved yields an empty record.
pub trait StateStore: Send + Sync {
    fn load(&self, key: &StoreKey) -> Result<DataMap, StorageError>;
    fn save(&self, key: &StoreKey, data: &DataMap) -> Result<(), StorageError>;
}

/// A store scoped to a single record
#[derive(Clone)]
pub struct UserDataStore<'a> {
    store: &'a dyn StateStore,
    key: StoreKey,
}

impl<'a> UserDataStore<'a> {
    pub fn new(store: &'a dyn StateStore, key: StoreKey) -> Self {
        Self { store, key }
    }

    pub fn get(&self) -> Result<DataMap, StorageError> {
        self.store.load(&self.key)
    }

    pub fn set(&self, data: &DataMap) -> Result<(), StorageError> {
        self.store.save(&self.key, data)
    }
}
