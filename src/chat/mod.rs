//! Chat service: the single-room broadcast-and-persist behaviour.

mod message;
mod service;

pub use message::ChatMessage;
pub use service::{
    BroadcastOutcome, ChatService, ChatStatsSnapshot, MessageOutcome, PersistOutcome,
    ERROR_EVENT, MESSAGE_EVENT,
};
