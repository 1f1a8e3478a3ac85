//! Domain traits - Abstractions for infrastructure implementations

pub mod sender;
pub mod store;

pub use sender::MessageSender;
pub use store::{StateStore, StoreKey, UserDataStore};
