//! What a handler gets to work with while it runs

use std::collections::HashMap;

use crate::application::errors::{DeliveryError, StorageError};
use crate::application::services::IntentState;
use crate::domain::entities::{DataMap, Event, IntentCatalog, OutboundMessage};
use crate::domain::traits::{MessageSender, StateStore, StoreKey, UserDataStore};

/// Invocation context supplied by the caller of `dispatch`
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub project_id: Option<String>,
    pub request_id: Option<String>,
    pub data: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Get data from context
    pub fn get(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    /// Set data in context
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

/// One handler call: the event being handled plus the collaborators needed
/// to answer it
pub struct Invocation<'a> {
    pub event: &'a Event,
    pub context: &'a Context,
    request_id: &'a str,
    catalog: &'a IntentCatalog,
    sender: &'a dyn MessageSender,
    store: &'a dyn StateStore,
}

impl<'a> Invocation<'a> {
    pub fn new(
        event: &'a Event,
        context: &'a Context,
        request_id: &'a str,
        catalog: &'a IntentCatalog,
        sender: &'a dyn MessageSender,
        store: &'a dyn StateStore,
    ) -> Self {
        Self {
            event,
            context,
            request_id,
            catalog,
            sender,
            store,
        }
    }

    /// The caller's request id, or the one generated for this dispatch
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Reply to the chat the event came from
    pub fn reply(&self, message: impl Into<OutboundMessage>) -> Result<(), DeliveryError> {
        self.sender.send(&self.event.recipient(), &message.into())
    }

    pub fn user_data(&self) -> Result<DataMap, StorageError> {
        self.user_store().get()
    }

    /// Replaces the sender's record. Keys starting with `_intent` and
    /// `_slot` belong to the intent state and should be left alone.
    pub fn set_user_data(&self, data: &DataMap) -> Result<(), StorageError> {
        self.user_store().set(data)
    }

    pub fn project_data(&self) -> Result<DataMap, StorageError> {
        self.store.load(&StoreKey::Project)
    }

    pub fn set_project_data(&self, data: &DataMap) -> Result<(), StorageError> {
        self.store.save(&StoreKey::Project, data)
    }

    /// The sender's intent dialogue, e.g. to close it from a `/cancel` command
    pub fn intent_state(&self) -> IntentState<'a> {
        IntentState::new(self.catalog, self.user_store())
    }

    fn user_store(&self) -> UserDataStore<'a> {
        UserDataStore::new(self.store, StoreKey::for_event(self.event))
    }
}
