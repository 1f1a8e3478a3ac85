//! Event dispatch and multi-turn intent slot filling for chat bots.
//!
//! A [`Dispatcher`] routes each inbound [`Event`] to one application
//! handler: `/intent <id>` starts a dialogue, other slash commands run their
//! command handler, free text continues an open dialogue, and anything else
//! goes to the handler bound to the event's channel. Dialogue progress is
//! kept in the user's stored record between events.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{BotError, DispatchError, HandlerError};
pub use application::messaging::{Context, Dispatcher, HandlerRegistry, Invocation};
pub use application::services::IntentState;
pub use domain::entities::{Answers, Event, Intent, IntentCatalog, IntentResult, OutboundMessage, Slot, User};
