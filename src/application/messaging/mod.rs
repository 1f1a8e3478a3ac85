//! Message handling - Event routing and handler registration

pub mod context;
pub mod dispatcher;
pub mod parser;
pub mod registry;

pub use context::{Context, Invocation};
pub use dispatcher::Dispatcher;
pub use parser::{MessageParser, Route};
pub use registry::{HandlerKind, HandlerRegistry, HandlerRegistryBuilder, HandlerResult};
