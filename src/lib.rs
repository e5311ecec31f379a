// Shared infrastructure
pub mod config;
pub mod error;
pub mod telemetry;

// Socket.IO relay layer
pub mod relay;

// Chat behaviour and persistence
pub mod chat;
pub mod store;

// Application layer
pub mod server;
