//! Message parser - Classifies event content into a route

/// How the content of an event should be routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/intent <intent_id>`, exactly two tokens
    StartIntent { intent_id: String },
    /// Any other content starting with the command prefix
    Command { name: String, args: Vec<String> },
    /// Free text
    Text,
}

/// Parses event content against a command prefix
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn parse(&self, content: &str) -> Route {
        if self.command_prefix.is_empty() {
            return Route::Text;
        }
        let Some(cmd_text) = content.strip_prefix(self.command_prefix.as_str()) else {
            return Route::Text;
        };

        let mut tokens = cmd_text.split_whitespace();
        // "/ foo" has an empty command name, the same as a bare "/"
        let name = if cmd_text.starts_with(char::is_whitespace) {
            String::new()
        } else {
            tokens.next().unwrap_or_default().to_string()
        };
        let args: Vec<String> = tokens.map(str::to_string).collect();

        match (name.as_str(), args.as_slice()) {
            ("intent", [intent_id]) => Route::StartIntent {
                intent_id: intent_id.clone(),
            },
            _ => Route::Command { name, args },
        }
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new("/")
    }
}
