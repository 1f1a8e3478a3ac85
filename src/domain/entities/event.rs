use serde::{Deserialize, Serialize};
use super::User;

/// An inbound event delivered by a messaging platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub content: String,
    pub channel: String,
    #[serde(default)]
    pub sender: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl Event {
    pub fn new(channel: impl Into<String>, sender: User, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            channel: channel.into(),
            sender,
            chat_id: None,
        }
    }

    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Where replies to this event go. Direct chats have no chat id, so the
    /// sender is addressed instead.
    pub fn recipient(&self) -> Recipient {
        Recipient {
            channel: self.channel.clone(),
            chat_id: self
                .chat_id
                .clone()
                .unwrap_or_else(|| self.sender.id.clone()),
        }
    }
}

/// Destination of an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    pub channel: String,
    pub chat_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_from_platform_json() {
        let event: Event = serde_json::from_str(
            r#"{"content": "hello", "channel": "telegram", "sender": {"id": "42"}}"#,
        )
        .unwrap();

        assert_eq!(event.content, "hello");
        assert_eq!(event.sender.id, "42");
        assert_eq!(event.chat_id, None);
    }

    #[test]
    fn test_recipient_prefers_chat_id() {
        let direct = Event::new("slack", User::new("u1"), "hi");
        assert_eq!(direct.recipient().chat_id, "u1");

        let group = direct.with_chat_id("room-7");
        assert_eq!(group.recipient().chat_id, "room-7");
        assert_eq!(group.recipient().channel, "slack");
    }
}
