use serde::{Deserialize, Serialize};
use std::fmt;

/// One rendering instruction of a rich message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Directive {
    SetText {
        text: String,
    },
    AddUrlButton {
        text: String,
        url: String,
    },
    AddPostbackButton {
        text: String,
        payload: String,
    },
    AddQuickReply {
        text: String,
        payload: Option<String>,
        image_url: Option<String>,
    },
    /// The text is ignored by platforms that render their own label.
    AddLocationRequest {
        text: String,
    },
    AddKeyboardButton {
        text: String,
    },
}

impl Directive {
    pub fn command(&self) -> &'static str {
        match self {
            Directive::SetText { .. } => "set_text",
            Directive::AddUrlButton { .. } => "add_url_button",
            Directive::AddPostbackButton { .. } => "add_postback_button",
            Directive::AddQuickReply { .. } => "add_quick_reply",
            Directive::AddLocationRequest { .. } => "add_location_request",
            Directive::AddKeyboardButton { .. } => "add_keyboard_button",
        }
    }
}

/// A message with buttons, quick replies and the like.
///
/// Platform adapters replay the model in order; what each directive looks
/// like is up to the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichMessage {
    pub model: Vec<Directive>,
}

impl RichMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(mut self, text: impl Into<String>) -> Self {
        self.model.push(Directive::SetText { text: text.into() });
        self
    }

    pub fn add_url_button(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.model.push(Directive::AddUrlButton {
            text: text.into(),
            url: url.into(),
        });
        self
    }

    pub fn add_postback_button(
        mut self,
        text: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        self.model.push(Directive::AddPostbackButton {
            text: text.into(),
            payload: payload.into(),
        });
        self
    }

    pub fn add_quick_reply(
        mut self,
        text: impl Into<String>,
        payload: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        self.model.push(Directive::AddQuickReply {
            text: text.into(),
            payload,
            image_url,
        });
        self
    }

    pub fn add_location_request(mut self, text: impl Into<String>) -> Self {
        self.model.push(Directive::AddLocationRequest { text: text.into() });
        self
    }

    pub fn add_keyboard_button(mut self, text: impl Into<String>) -> Self {
        self.model.push(Directive::AddKeyboardButton { text: text.into() });
        self
    }

    /// Text of the first `set_text` directive
    pub fn text(&self) -> Option<&str> {
        self.model.iter().find_map(|d| match d {
            Directive::SetText { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for RichMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, directive) in self.model.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let value = serde_json::to_value(directive).map_err(|_| fmt::Error)?;
            let args = value.get("args").ok_or(fmt::Error)?;
            write!(f, "{} {}", directive.command(), args)?;
        }
        Ok(())
    }
}

/// Anything a bot can send back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Text(String),
    Rich(RichMessage),
}

impl OutboundMessage {
    pub fn text(&self) -> Option<&str> {
        match self {
            OutboundMessage::Text(text) => Some(text.as_str()),
            OutboundMessage::Rich(rich) => rich.text(),
        }
    }

    /// A question, with its options offered as postback buttons when there
    /// are any.
    pub fn prompt(question: &str, options: &[String]) -> Self {
        if options.is_empty() {
            return OutboundMessage::Text(question.to_string());
        }
        let message = options
            .iter()
            .fold(RichMessage::new().set_text(question), |message, option| {
                message.add_postback_button(option.as_str(), option.as_str())
            });
        OutboundMessage::Rich(message)
    }
}

impl From<String> for OutboundMessage {
    fn from(text: String) -> Self {
        OutboundMessage::Text(text)
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        OutboundMessage::Text(text.to_string())
    }
}

impl From<RichMessage> for OutboundMessage {
    fn from(message: RichMessage) -> Self {
        OutboundMessage::Rich(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_directives_serialize_as_command_and_args() {
        let message = RichMessage::new()
            .set_text("Hi there!")
            .add_quick_reply("Say hello", None, None)
            .add_url_button("Docs", "https://example.com");

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"model": [
                {"command": "set_text", "args": {"text": "Hi there!"}},
                {"command": "add_quick_reply", "args": {"text": "Say hello", "payload": null, "image_url": null}},
                {"command": "add_url_button", "args": {"text": "Docs", "url": "https://example.com"}},
            ]})
        );
    }

    #[test]
    fn test_prompt_with_options_uses_postback_buttons() {
        let options = vec!["red".to_string(), "blue".to_string()];
        let OutboundMessage::Rich(message) = OutboundMessage::prompt("Pick a color", &options) else {
            panic!("expected a rich message");
        };

        assert_eq!(message.text(), Some("Pick a color"));
        assert_eq!(
            message.model[1..],
            [
                Directive::AddPostbackButton { text: "red".into(), payload: "red".into() },
                Directive::AddPostbackButton { text: "blue".into(), payload: "blue".into() },
            ]
        );
    }

    #[test]
    fn test_prompt_without_options_is_plain_text() {
        let message = OutboundMessage::prompt("Your name?", &[]);
        assert_eq!(message, OutboundMessage::Text("Your name?".to_string()));
    }

    #[test]
    fn test_display_lists_directives() {
        let message = RichMessage::new().set_text("Hi").add_keyboard_button("Ok");
        assert_eq!(
            message.to_string(),
            "set_text {\"text\":\"Hi\"}\nadd_keyboard_button {\"text\":\"Ok\"}"
        );
    }

    #[test]
    fn test_display_renders_args_of_every_directive() {
        let message = RichMessage::new()
            .set_text("Hi")
            .add_url_button("Docs", "https://example.com")
            .add_postback_button("Yes", "yes")
            .add_quick_reply("Hello", Some("hello".to_string()), None)
            .add_location_request("Share location")
            .add_keyboard_button("Ok");

        let rendered = message.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        for (line, directive) in lines.iter().zip(&message.model) {
            let (command, args) = line.split_once(' ').unwrap();
            assert_eq!(command, directive.command());
            assert!(args.starts_with('{'), "args not rendered: {}", line);
        }
        assert_eq!(
            lines[3],
            "add_quick_reply {\"text\":\"Hello\",\"payload\":\"hello\",\"image_url\":null}"
        );
    }
}
