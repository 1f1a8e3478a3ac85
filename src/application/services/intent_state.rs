//! Slot-filling state machine.
//!
//! State lives in the user's stored record, never in this type: every
//! operation loads the record, applies one transition and saves it back.

use crate::application::errors::DispatchError;
use crate::domain::entities::{Answers, Event, IntentCatalog, IntentResult, UserState};
use crate::domain::traits::UserDataStore;

/// Drives one user's intent dialogue
pub struct IntentState<'a> {
    catalog: &'a IntentCatalog,
    data: UserDataStore<'a>,
}

impl<'a> IntentState<'a> {
    pub fn new(catalog: &'a IntentCatalog, data: UserDataStore<'a>) -> Self {
        Self { catalog, data }
    }

    /// Starts `intent_id` from its first slot, discarding any dialogue that
    /// was in progress.
    pub fn open(&self, intent_id: &str) -> Result<(), DispatchError> {
        let intent = self
            .catalog
            .get(intent_id)
            .ok_or_else(|| DispatchError::UnknownIntent(intent_id.to_string()))?;

        tracing::debug!(intent = intent_id, slots = intent.slots.len(), "opening intent");

        let mut data = self.data.get()?;
        UserState::opened(intent_id, intent.slots.clone()).write(&mut data)?;
        self.data.set(&data)?;
        Ok(())
    }

    /// Advances the open intent.
    ///
    /// `event` carries the answer to the question asked by the previous
    /// call and must be `None` on the first call after [`open`](Self::open).
    pub fn next(&self, event: Option<&Event>) -> Result<IntentResult, DispatchError> {
        let mut data = self.data.get()?;
        let mut state = UserState::read(&data)?;

        let (Some(intent_id), Some(remaining)) =
            (state.current_intent_id.clone(), state.remaining_slots.as_mut())
        else {
            return Err(DispatchError::NoSlotRemaining);
        };

        let answers = state.answers.get_or_insert_with(Answers::new);
        if let Some(event) = event {
            let slot_id = state
                .current_slot_id
                .as_deref()
                .ok_or_else(|| DispatchError::NoPendingSlot(intent_id.clone()))?;
            answers.insert(slot_id, event.content.as_str());
        }
        let answers = answers.clone();

        let completion_handler_name = self
            .catalog
            .get(&intent_id)
            .and_then(|intent| intent.completion_handler_name.clone());

        let result = if remaining.is_empty() {
            tracing::debug!(intent = %intent_id, answers = answers.len(), "intent completed");
            state.clear();
            IntentResult {
                intent_id,
                completed: true,
                answers,
                next_message: None,
                completion_handler_name,
                options: Vec::new(),
            }
        } else {
            let slot = remaining.remove(0);
            tracing::debug!(intent = %intent_id, slot = %slot.id, "asking next slot");
            state.current_slot_id = Some(slot.id);
            state.current_slot_datatype = Some(slot.datatype);
            IntentResult {
                intent_id,
                completed: false,
                answers,
                next_message: Some(slot.question),
                completion_handler_name,
                options: slot.options,
            }
        };

        state.write(&mut data)?;
        self.data.set(&data)?;
        Ok(result)
    }

    pub fn is_opened(&self) -> Result<bool, DispatchError> {
        Ok(UserState::read(&self.data.get()?)?.is_open())
    }

    /// Abandons whatever dialogue is open. Closing a closed state is a no-op
    /// apart from rewriting the record.
    pub fn close(&self) -> Result<(), DispatchError> {
        let mut data = self.data.get()?;
        let mut state = UserState::read(&data)?;
        if let Some(intent_id) = &state.current_intent_id {
            tracing::debug!(intent = %intent_id, "closing intent");
        }
        state.clear();
        state.write(&mut data)?;
        self.data.set(&data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DataMap, Intent, Slot, User};
    use crate::domain::traits::{StateStore, StoreKey};
    use crate::infrastructure::storage::MemoryStore;
    use serde_json::json;

    fn catalog() -> IntentCatalog {
        IntentCatalog::new(vec![
            Intent::new("credentials")
                .on_complete("set_credentials")
                .with_slot(Slot::new("app_id", "Please tell me your app ID"))
                .with_slot(Slot::new("app_secret", "Please tell me your app secret")),
            Intent::new("address")
                .on_complete("set_address")
                .with_slot(Slot::new("country", "Please tell me your country"))
                .with_slot(Slot::new("city", "Please tell me your city").with_options(["Seoul", "Busan"]))
                .with_slot(Slot::new("road", "Please tell me your road address")),
            Intent::new("empty"),
        ])
    }

    fn key() -> StoreKey {
        StoreKey::user("fakechannel", "user-1")
    }

    fn answer(content: &str) -> Event {
        Event::new("fakechannel", User::new("user-1"), content)
    }

    #[test]
    fn test_open_sets_initial_entries() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));

        state.open("credentials").unwrap();

        let data = store.load(&key()).unwrap();
        assert_eq!(data["_intent_id"], json!("credentials"));
        assert_eq!(data["_intent_answers"], json!({}));
        assert_eq!(
            data["_remaining_slots"],
            json!([
                {"id": "app_id", "question": "Please tell me your app ID", "options": [], "datatype": "string"},
                {"id": "app_secret", "question": "Please tell me your app secret", "options": [], "datatype": "string"},
            ])
        );
        assert!(state.is_opened().unwrap());
    }

    #[test]
    fn test_questions_follow_slot_order() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        state.open("address").unwrap();

        let first = state.next(None).unwrap();
        assert!(!first.completed);
        assert_eq!(first.next_message.as_deref(), Some("Please tell me your country"));

        let second = state.next(Some(&answer("Korea"))).unwrap();
        assert_eq!(second.next_message.as_deref(), Some("Please tell me your city"));
        assert_eq!(second.options, vec!["Seoul", "Busan"]);
        assert_eq!(second.answers.get("country"), Some("Korea"));

        let third = state.next(Some(&answer("Seoul"))).unwrap();
        assert_eq!(third.next_message.as_deref(), Some("Please tell me your road address"));

        let done = state.next(Some(&answer("Teheran-ro"))).unwrap();
        assert!(done.completed);
        assert_eq!(done.next_message, None);
        assert_eq!(done.completion_handler_name.as_deref(), Some("set_address"));
        let collected: Vec<(&str, &str)> = done.answers.iter().collect();
        assert_eq!(
            collected,
            vec![("country", "Korea"), ("city", "Seoul"), ("road", "Teheran-ro")]
        );
        assert!(!state.is_opened().unwrap());
    }

    #[test]
    fn test_next_after_completion_fails() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        state.open("credentials").unwrap();
        state.next(None).unwrap();
        state.next(None).unwrap();
        assert!(state.next(None).unwrap().completed);

        let err = state.next(None).unwrap_err();
        assert!(matches!(err, DispatchError::NoSlotRemaining));
    }

    #[test]
    fn test_next_without_open_fails() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));

        assert!(matches!(state.next(None), Err(DispatchError::NoSlotRemaining)));
        assert!(matches!(
            state.next(Some(&answer("stray"))),
            Err(DispatchError::NoSlotRemaining)
        ));
    }

    #[test]
    fn test_answer_before_first_question_fails() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        state.open("credentials").unwrap();

        let err = state.next(Some(&answer("too early"))).unwrap_err();
        assert!(matches!(err, DispatchError::NoPendingSlot(id) if id == "credentials"));
    }

    #[test]
    fn test_zero_slot_intent_completes_immediately() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        state.open("empty").unwrap();

        let result = state.next(None).unwrap();
        assert!(result.completed);
        assert!(result.answers.is_empty());
        assert_eq!(result.next_message, None);
        assert!(!state.is_opened().unwrap());
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));

        let err = state.open("nope").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownIntent(id) if id == "nope"));
        assert!(!state.is_opened().unwrap());
    }

    #[test]
    fn test_close_is_idempotent_and_reopen_starts_fresh() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        state.open("credentials").unwrap();
        state.next(None).unwrap();
        state.next(Some(&answer("myid"))).unwrap();

        state.close().unwrap();
        state.close().unwrap();
        assert!(!state.is_opened().unwrap());

        state.open("credentials").unwrap();
        let first = state.next(None).unwrap();
        assert_eq!(first.next_message.as_deref(), Some("Please tell me your app ID"));
        assert!(first.answers.is_empty());
    }

    #[test]
    fn test_application_keys_survive_transitions() {
        let store = MemoryStore::new();
        let mut data = DataMap::new();
        data.insert("nickname".to_string(), json!("neo"));
        store.save(&key(), &data).unwrap();

        let catalog = catalog();
        let state = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        state.open("empty").unwrap();
        state.next(None).unwrap();
        state.close().unwrap();

        assert_eq!(store.load(&key()).unwrap()["nickname"], json!("neo"));
    }

    #[test]
    fn test_users_do_not_share_state() {
        let store = MemoryStore::new();
        let catalog = catalog();
        let alice = IntentState::new(&catalog, UserDataStore::new(&store, key()));
        let bob = IntentState::new(
            &catalog,
            UserDataStore::new(&store, StoreKey::user("fakechannel", "user-2")),
        );

        alice.open("credentials").unwrap();
        assert!(alice.is_opened().unwrap());
        assert!(!bob.is_opened().unwrap());
    }
}
