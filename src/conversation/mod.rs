//! Conversation state and the request flow behind it

pub mod controller;
pub mod exchange;
pub mod input;
pub mod message;
pub mod routing;

#[cfg(test)]
pub mod testing;

pub use controller::{ConversationController, ERROR_MESSAGE};
pub use exchange::Reply;
pub use input::InputBuffer;
pub use message::{Message, MessageKind};
pub use routing::RouteSettings;
