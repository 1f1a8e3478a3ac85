//! Slot-filling progress of one user, persisted alongside the user's own data

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Answers, Slot};
use crate::application::errors::StorageError;

/// A stored record: the free-form JSON object kept per user (or per project)
pub type DataMap = serde_json::Map<String, Value>;

pub const INTENT_ID_FIELD: &str = "_intent_id";
pub const ANSWERS_FIELD: &str = "_intent_answers";
pub const REMAINING_SLOTS_FIELD: &str = "_remaining_slots";
pub const SLOT_ID_FIELD: &str = "_slot_id";
pub const SLOT_DATATYPE_FIELD: &str = "_slot_datatype";

const FIELDS: [&str; 5] = [
    INTENT_ID_FIELD,
    ANSWERS_FIELD,
    REMAINING_SLOTS_FIELD,
    SLOT_ID_FIELD,
    SLOT_DATATYPE_FIELD,
];

/// Intent fields of a user's record.
///
/// Either every field is `None` (closed) or `current_intent_id` is set and
/// the dialogue is open. `answers` holds only consumed slots, in order;
/// `remaining_slots` holds the slots not asked yet, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    #[serde(rename = "_intent_id", default)]
    pub current_intent_id: Option<String>,
    #[serde(rename = "_intent_answers", default)]
    pub answers: Option<Answers>,
    #[serde(rename = "_remaining_slots", default)]
    pub remaining_slots: Option<Vec<Slot>>,
    #[serde(rename = "_slot_id", default)]
    pub current_slot_id: Option<String>,
    #[serde(rename = "_slot_datatype", default)]
    pub current_slot_datatype: Option<String>,
}

impl UserState {
    pub fn opened(intent_id: impl Into<String>, slots: Vec<Slot>) -> Self {
        Self {
            current_intent_id: Some(intent_id.into()),
            answers: Some(Answers::new()),
            remaining_slots: Some(slots),
            current_slot_id: None,
            current_slot_datatype: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current_intent_id.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Extracts the intent fields from a stored record. Absent keys read as
    /// closed.
    pub fn read(data: &DataMap) -> Result<Self, StorageError> {
        let fields: DataMap = FIELDS
            .iter()
            .filter_map(|&key| data.get(key).map(|v| (key.to_string(), v.clone())))
            .collect();

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| StorageError::Serialization(format!("invalid intent state: {}", e)))
    }

    /// Writes the intent fields into a record, leaving every other key as
    /// it was.
    pub fn write(&self, data: &mut DataMap) -> Result<(), StorageError> {
        let Value::Object(fields) = serde_json::to_value(self)
            .map_err(|e| StorageError::Serialization(e.to_string()))?
        else {
            return Err(StorageError::Serialization(
                "intent state did not serialize to an object".to_string(),
            ));
        };

        for (key, value) in fields {
            data.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_read_as_closed() {
        let mut data = DataMap::new();
        data.insert("favourite_color".to_string(), json!("blue"));

        let state = UserState::read(&data).unwrap();
        assert_eq!(state, UserState::default());
        assert!(!state.is_open());
    }

    #[test]
    fn test_write_keeps_application_keys() {
        let mut data = DataMap::new();
        data.insert("favourite_color".to_string(), json!("blue"));

        let state = UserState::opened("credentials", vec![Slot::new("app_id", "Your app ID?")]);
        state.write(&mut data).unwrap();

        assert_eq!(data["favourite_color"], json!("blue"));
        assert_eq!(data[INTENT_ID_FIELD], json!("credentials"));
        assert_eq!(
            data[REMAINING_SLOTS_FIELD],
            json!([{"id": "app_id", "question": "Your app ID?", "options": [], "datatype": "string"}])
        );
        assert_eq!(UserState::read(&data).unwrap(), state);
    }

    #[test]
    fn test_closed_state_writes_nulls() {
        let mut data = DataMap::new();
        UserState::opened("credentials", Vec::new())
            .write(&mut data)
            .unwrap();

        let mut state = UserState::read(&data).unwrap();
        state.clear();
        state.write(&mut data).unwrap();

        for key in FIELDS {
            assert_eq!(data[key], Value::Null, "{} should be null", key);
        }
    }
}
