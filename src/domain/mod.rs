//! Domain layer - Core business objects and the seams to infrastructure
//!
//! This layer contains:
//! - Entities: events, intents, per-user intent state, outbound messages
//! - Traits: abstractions for persistence and message delivery

pub mod entities;
pub mod traits;
