//! Domain entities - Core business objects

pub mod event;
pub mod intent;
pub mod outbound;
pub mod user;
pub mod user_state;

pub use event::{Event, Recipient};
pub use intent::{Answers, Intent, IntentCatalog, IntentResult, Slot};
pub use outbound::{Directive, OutboundMessage, RichMessage};
pub use user::User;
pub use user_state::{DataMap, UserState};
