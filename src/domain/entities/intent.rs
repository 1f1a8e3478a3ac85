use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One question asked while filling an intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
    #[serde(default = "default_datatype")]
    pub datatype: String,
}

fn default_datatype() -> String {
    "string".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Slot {
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            options: Vec::new(),
            datatype: default_datatype(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A multi-turn dialogue collecting answers to an ordered list of slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub id: String,
    pub completion_handler_name: Option<String>,
    pub slots: Vec<Slot>,
}

impl Intent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            completion_handler_name: None,
            slots: Vec::new(),
        }
    }

    pub fn on_complete(mut self, handler_name: impl Into<String>) -> Self {
        self.completion_handler_name = Some(handler_name.into());
        self
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }
}

/// Every intent known to a bot, fixed once loaded
#[derive(Debug, Clone, Default)]
pub struct IntentCatalog {
    intents: Vec<Intent>,
    index: HashMap<String, usize>,
}

impl IntentCatalog {
    pub fn new(intents: Vec<Intent>) -> Self {
        let mut catalog = Self::default();
        for intent in intents {
            match catalog.index.get(&intent.id) {
                Some(&pos) => catalog.intents[pos] = intent,
                None => {
                    catalog.index.insert(intent.id.clone(), catalog.intents.len());
                    catalog.intents.push(intent);
                }
            }
        }
        catalog
    }

    pub fn get(&self, intent_id: &str) -> Option<&Intent> {
        self.index.get(intent_id).map(|&pos| &self.intents[pos])
    }

    pub fn all(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Collected answers keyed by slot id, kept in the order they were given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers(Vec<(String, String)>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer. Answering the same slot again replaces the old
    /// value in place.
    pub fn insert(&mut self, slot_id: impl Into<String>, answer: impl Into<String>) {
        let slot_id = slot_id.into();
        let answer = answer.into();
        match self.0.iter_mut().find(|(id, _)| *id == slot_id) {
            Some(entry) => entry.1 = answer,
            None => self.0.push((slot_id, answer)),
        }
    }

    pub fn get(&self, slot_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(id, _)| id == slot_id)
            .map(|(_, answer)| answer.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, answer)| (id.as_str(), answer.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Answers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut answers = Answers::new();
        for (slot_id, answer) in iter {
            answers.insert(slot_id, answer);
        }
        answers
    }
}

impl Serialize for Answers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (slot_id, answer) in &self.0 {
            map.serialize_entry(slot_id, answer)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Answers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnswersVisitor;

        impl<'de> Visitor<'de> for AnswersVisitor {
            type Value = Answers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of slot ids to answers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Answers, A::Error> {
                let mut answers = Answers::new();
                while let Some((slot_id, answer)) =
                    access.next_entry::<String, Option<String>>()?
                {
                    if let Some(answer) = answer {
                        answers.insert(slot_id, answer);
                    }
                }
                Ok(answers)
            }
        }

        deserializer.deserialize_map(AnswersVisitor)
    }
}

/// Outcome of advancing an open intent by one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentResult {
    pub intent_id: String,
    pub completed: bool,
    pub answers: Answers,
    /// The next question, `None` exactly when the intent completed.
    pub next_message: Option<String>,
    pub completion_handler_name: Option<String>,
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keeps_declaration_order() {
        let catalog = IntentCatalog::new(vec![
            Intent::new("credentials"),
            Intent::new("address"),
            Intent::new("empty"),
        ]);

        let ids: Vec<&str> = catalog.all().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["credentials", "address", "empty"]);
        assert!(catalog.get("address").is_some());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_answers_preserve_order_through_json() {
        let answers: Answers = [("zeta", "1"), ("alpha", "2")].into_iter().collect();
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);

        let back: Answers = serde_json::from_str(&json).unwrap();
        let ids: Vec<&str> = back.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_slot_accepts_null_options() {
        let slot: Slot = serde_json::from_str(
            r#"{"id": "app_id", "question": "Please tell me your app ID", "options": null}"#,
        )
        .unwrap();

        assert!(slot.options.is_empty());
        assert_eq!(slot.datatype, "string");
    }
}
