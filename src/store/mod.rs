//! Persistence sink for chat messages.
//!
//! Backends:
//! - `memory`: in-process list
//! - `postgres`: JSONB documents in a PostgreSQL table

mod factory;
mod memory;
mod postgres;
mod sink;

pub use factory::create_message_sink;
pub use memory::MemoryMessageStore;
pub use postgres::PostgresMessageStore;
pub use sink::{MessageSink, SinkError};
