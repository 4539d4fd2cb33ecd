//! Client/server wire messages.

pub mod messages;

pub use messages::{ClientCommand, Outgoing, Recipient, ServerEvent};
