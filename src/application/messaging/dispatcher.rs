//! Message dispatcher - Routes each event to exactly one handler

use std::sync::Arc;

use uuid::Uuid;

use super::context::{Context, Invocation};
use super::parser::{MessageParser, Route};
use super::registry::HandlerRegistry;
use crate::application::errors::DispatchError;
use crate::application::services::IntentState;
use crate::domain::entities::{Event, IntentCatalog, IntentResult, OutboundMessage};
use crate::domain::traits::{MessageSender, StateStore, StoreKey, UserDataStore};

/// Routing engine. Holds no per-user state of its own, so one instance
/// serves every user; events of the same user must not be dispatched
/// concurrently.
pub struct Dispatcher {
    parser: MessageParser,
    registry: Arc<HandlerRegistry>,
    catalog: Arc<IntentCatalog>,
    store: Arc<dyn StateStore>,
    sender: Arc<dyn MessageSender>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        catalog: Arc<IntentCatalog>,
        store: Arc<dyn StateStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            parser: MessageParser::default(),
            registry,
            catalog,
            store,
            sender,
        }
    }

    /// Use a command prefix other than `/`
    pub fn with_parser(mut self, parser: MessageParser) -> Self {
        self.parser = parser;
        self
    }

    /// Routes one event. In order: `/intent <id>`, other commands, an open
    /// intent, then channel handlers.
    pub fn dispatch(&self, event: &Event, context: &Context) -> Result<(), DispatchError> {
        let request_id = context
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %request_id,
            channel = %event.channel,
            user = %event.sender.id,
        );
        let _guard = span.enter();

        let intents = IntentState::new(
            &self.catalog,
            UserDataStore::new(self.store.as_ref(), StoreKey::for_event(event)),
        );
        let invocation = Invocation::new(
            event,
            context,
            &request_id,
            &self.catalog,
            self.sender.as_ref(),
            self.store.as_ref(),
        );

        match self.parser.parse(&event.content) {
            Route::StartIntent { intent_id } => {
                tracing::debug!(intent = %intent_id, "starting intent");
                intents.open(&intent_id)?;
                let result = intents.next(None)?;
                self.advance(&invocation, result)
            }
            Route::Command { name, args } => self.run_command(&invocation, &name, &args),
            Route::Text => {
                if !intents.is_opened()? {
                    return self.route_channel(&invocation);
                }
                tracing::debug!("continuing open intent");
                let result = intents.next(Some(event))?;
                self.advance(&invocation, result)
            }
        }
    }

    fn run_command(
        &self,
        invocation: &Invocation<'_>,
        name: &str,
        args: &[String],
    ) -> Result<(), DispatchError> {
        match self.registry.lookup_command(name) {
            Some(binding) => {
                tracing::debug!(command = name, handler = binding.id(), "running command");
                (binding.handler())(invocation, args)?;
            }
            None => {
                tracing::debug!(command = name, "no such command");
                invocation.reply(format!("No such command: {}", name))?;
            }
        }
        Ok(())
    }

    /// Sends the next question, or hands the answers to the completion
    /// handler once the intent is done.
    fn advance(&self, invocation: &Invocation<'_>, result: IntentResult) -> Result<(), DispatchError> {
        if !result.completed {
            let question = result.next_message.as_deref().unwrap_or_default();
            invocation.reply(OutboundMessage::prompt(question, &result.options))?;
            return Ok(());
        }

        match self.registry.lookup_intent_completion(&result.intent_id) {
            Some(binding) => {
                tracing::debug!(intent = %result.intent_id, handler = binding.id(), "running completion handler");
                (binding.handler())(invocation, &result.answers)?;
            }
            None => {
                tracing::debug!(
                    intent = %result.intent_id,
                    on_complete = ?result.completion_handler_name,
                    "no completion handler bound, dropping answers"
                );
            }
        }
        Ok(())
    }

    fn route_channel(&self, invocation: &Invocation<'_>) -> Result<(), DispatchError> {
        let channel = &invocation.event.channel;
        match self.registry.resolve_channel(channel) {
            Some(binding) => {
                tracing::debug!(channel = %channel, handler = binding.id(), "routing to channel handler");
                (binding.handler())(invocation)?;
            }
            None => {
                tracing::debug!(channel = %channel, "no channel handler, dropping event");
            }
        }
        Ok(())
    }
}
