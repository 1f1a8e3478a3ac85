//! Handler registry - Maps commands, intents and channels to application
//! handlers

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::context::Invocation;
use crate::application::errors::{HandlerError, RegistryError};
use crate::domain::entities::{Answers, IntentCatalog};

/// Handler result
pub type HandlerResult = Result<(), HandlerError>;

/// Runs a slash command with its arguments
pub type CommandHandler = Arc<dyn Fn(&Invocation<'_>, &[String]) -> HandlerResult + Send + Sync>;

/// Runs once every slot of an intent has an answer
pub type CompletionHandler = Arc<dyn Fn(&Invocation<'_>, &Answers) -> HandlerResult + Send + Sync>;

/// Handles free text arriving on a channel
pub type ChannelHandler = Arc<dyn Fn(&Invocation<'_>) -> HandlerResult + Send + Sync>;

/// Channel entry used when an event's channel has no binding of its own
pub const DEFAULT_CHANNEL: &str = "default";

/// Id of the conventional catch-all handler, tried after the default channel
pub const DEFAULT_HANDLER_ID: &str = "on_default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Command,
    Intent,
    Channel,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            HandlerKind::Command => "command",
            HandlerKind::Intent => "intent",
            HandlerKind::Channel => "channel",
        };
        f.write_str(kind)
    }
}

/// A handler together with the id it is logged under
pub struct Binding<H> {
    id: String,
    handler: H,
}

impl<H> Binding<H> {
    fn new(id: String, handler: H) -> Self {
        Self { id, handler }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Read-only lookup tables, built once per bot
pub struct HandlerRegistry {
    commands: HashMap<String, Binding<CommandHandler>>,
    intents: HashMap<String, Binding<CompletionHandler>>,
    channels: HashMap<String, Binding<ChannelHandler>>,
    fallback: Option<Binding<ChannelHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn lookup_command(&self, name: &str) -> Option<&Binding<CommandHandler>> {
        self.commands.get(name)
    }

    pub fn lookup_intent_completion(&self, intent_id: &str) -> Option<&Binding<CompletionHandler>> {
        self.intents.get(intent_id)
    }

    /// Exact channel match, else the `default` channel entry
    pub fn lookup_channel(&self, name: &str) -> Option<&Binding<ChannelHandler>> {
        self.channels
            .get(name)
            .or_else(|| self.channels.get(DEFAULT_CHANNEL))
    }

    /// [`lookup_channel`](Self::lookup_channel), then the `on_default` handler
    pub fn resolve_channel(&self, name: &str) -> Option<&Binding<ChannelHandler>> {
        self.lookup_channel(name).or(self.fallback.as_ref())
    }

    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Intents of `catalog` whose completion would be dropped
    pub fn unbound_intents<'c>(&self, catalog: &'c IntentCatalog) -> Vec<&'c str> {
        catalog
            .all()
            .map(|intent| intent.id.as_str())
            .filter(|id| !self.intents.contains_key(*id))
            .collect()
    }
}

/// Collects handler bindings. A later binding for the same kind and name
/// replaces the earlier one unless the builder is [`strict`](Self::strict).
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    strict: bool,
    commands: HashMap<String, Binding<CommandHandler>>,
    intents: HashMap<String, Binding<CompletionHandler>>,
    channels: HashMap<String, Binding<ChannelHandler>>,
    fallback: Option<Binding<ChannelHandler>>,
    conflicts: Vec<RegistryError>,
}

impl HandlerRegistryBuilder {
    /// Make `build` fail on duplicate bindings
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn command<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>, &[String]) -> HandlerResult + Send + Sync + 'static,
    {
        let name = name.into();
        let binding = Binding::new(format!("on_{}", name), Arc::new(handler) as CommandHandler);
        insert(&mut self.commands, &mut self.conflicts, HandlerKind::Command, name, binding);
        self
    }

    pub fn intent<F>(mut self, intent_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>, &Answers) -> HandlerResult + Send + Sync + 'static,
    {
        let intent_id = intent_id.into();
        let binding = Binding::new(
            format!("set_{}", intent_id),
            Arc::new(handler) as CompletionHandler,
        );
        insert(&mut self.intents, &mut self.conflicts, HandlerKind::Intent, intent_id, binding);
        self
    }

    pub fn channel<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        let name = name.into();
        let binding = Binding::new(format!("on_{}", name), Arc::new(handler) as ChannelHandler);
        insert(&mut self.channels, &mut self.conflicts, HandlerKind::Channel, name, binding);
        self
    }

    /// Channel binding without an explicit channel name
    pub fn default_channel<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.channel(DEFAULT_CHANNEL, handler)
    }

    /// The conventional `on_default` handler
    pub fn on_default<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        if self.fallback.is_some() {
            warn_or_record(&mut self.conflicts, HandlerKind::Channel, DEFAULT_HANDLER_ID);
        }
        self.fallback = Some(Binding::new(
            DEFAULT_HANDLER_ID.to_string(),
            Arc::new(handler) as ChannelHandler,
        ));
        self
    }

    pub fn build(self) -> Result<HandlerRegistry, RegistryError> {
        if self.strict {
            if let Some(conflict) = self.conflicts.into_iter().next() {
                return Err(conflict);
            }
        }

        tracing::debug!(
            commands = self.commands.len(),
            intents = self.intents.len(),
            channels = self.channels.len(),
            "handler registry built"
        );

        Ok(HandlerRegistry {
            commands: self.commands,
            intents: self.intents,
            channels: self.channels,
            fallback: self.fallback,
        })
    }
}

fn insert<H>(
    table: &mut HashMap<String, Binding<H>>,
    conflicts: &mut Vec<RegistryError>,
    kind: HandlerKind,
    name: String,
    binding: Binding<H>,
) {
    if table.contains_key(&name) {
        warn_or_record(conflicts, kind, &name);
    }
    table.insert(name, binding);
}

fn warn_or_record(conflicts: &mut Vec<RegistryError>, kind: HandlerKind, name: &str) {
    tracing::warn!(%kind, binding = name, "duplicate handler binding");
    conflicts.push(RegistryError::DuplicateBinding {
        kind,
        name: name.to_string(),
    });
}
