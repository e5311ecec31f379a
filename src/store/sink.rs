//! Sink trait for chat message persistence.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::chat::ChatMessage;

/// Errors that can occur while writing a message.
#[derive(Debug, Error)]
pub enum SinkError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The write did not finish in time
    #[error("Write timed out after {0} ms")]
    Timeout(u64),

    /// Backend cannot take writes
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Write-only store for chat messages.
///
/// Implementations never retry; a failed insert is reported to the caller
/// and forgotten.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Insert one record, returning the id the store assigned
    async fn insert(&self, message: &ChatMessage) -> Result<Uuid, SinkError>;

    /// Release backend resources
    async fn close(&self) {}
}
