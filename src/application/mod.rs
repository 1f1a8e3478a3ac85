//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: the intent state machine
//! - Errors: Domain-specific errors
//! - Messaging: Parsing, handler registration, dispatching

pub mod errors;
pub mod messaging;
pub mod services;
