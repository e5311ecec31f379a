//! In-memory message sink.
//!
//! Records live in process memory and are lost on restart. Useful for
//! development and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::chat::ChatMessage;

use super::sink::{MessageSink, SinkError};

#[derive(Default)]
pub struct MemoryMessageStore {
    records: RwLock<Vec<ChatMessage>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored record, in insertion order
    pub async fn records(&self) -> Vec<ChatMessage> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MessageSink for MemoryMessageStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, message: &ChatMessage) -> Result<Uuid, SinkError> {
        let id = Uuid::new_v4();
        self.records.write().await.push(message.clone().with_id(id));

        tracing::trace!(message_id = %id, sender = %message.sender, "Message stored in memory");
        Ok(id)
    }
}
