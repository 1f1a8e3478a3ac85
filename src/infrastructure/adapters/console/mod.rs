//! Console adapter for development/testing

use std::io::Write;
use std::sync::Mutex;

use crate::application::errors::DeliveryError;
use crate::domain::entities::{Directive, OutboundMessage, Recipient};
use crate::domain::traits::MessageSender;

/// Prints outbound messages to a writer, stdout by default
pub struct ConsoleSender {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSender {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for ConsoleSender {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSender for ConsoleSender {
    fn send(&self, recipient: &Recipient, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let mut out = self.out.lock().map_err(|_| DeliveryError::Rejected {
            channel: recipient.channel.clone(),
            reason: "console writer poisoned".to_string(),
        })?;

        tracing::debug!(chat_id = %recipient.chat_id, "sending to console");
        render(&mut **out, message)?;
        out.flush()?;
        Ok(())
    }
}

fn render(out: &mut dyn Write, message: &OutboundMessage) -> std::io::Result<()> {
    let rich = match message {
        OutboundMessage::Text(text) => return writeln!(out, "[BOT] {}", text),
        OutboundMessage::Rich(rich) => rich,
    };

    let mut buttons = Vec::new();
    for directive in &rich.model {
        match directive {
            Directive::SetText { text } => writeln!(out, "[BOT] {}", text)?,
            Directive::AddUrlButton { text, url } => buttons.push(format!("{} <{}>", text, url)),
            Directive::AddLocationRequest { text } => buttons.push(format!("{} (location)", text)),
            Directive::AddPostbackButton { text, .. }
            | Directive::AddQuickReply { text, .. }
            | Directive::AddKeyboardButton { text } => buttons.push(text.clone()),
        }
    }
    if !buttons.is_empty() {
        writeln!(out, "  [Buttons] {}", buttons.join(" | "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RichMessage;

    fn rendered(message: &OutboundMessage) -> String {
        let mut out = Vec::new();
        render(&mut out, message).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_text() {
        assert_eq!(rendered(&"hello".into()), "[BOT] hello\n");
    }

    #[test]
    fn test_render_buttons_on_one_row() {
        let message = RichMessage::new()
            .set_text("Pick a plan")
            .add_postback_button("free", "free")
            .add_url_button("Pricing", "https://example.com/pricing");

        assert_eq!(
            rendered(&message.into()),
            "[BOT] Pick a plan\n  [Buttons] free | Pricing <https://example.com/pricing>\n"
        );
    }
}
