//! Application services - Business logic orchestration

pub mod intent_state;

pub use intent_state::IntentState;
