use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat message as written to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Assigned by the store on insert
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<Uuid>,
    /// Connection id of the author
    pub sender: String,
    pub content: String,
    /// Time the relay handled the message
    pub time: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            sender: sender.into(),
            content: content.into(),
            time: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_layout() {
        let message = ChatMessage::new("conn-1", "hello");
        let doc = serde_json::to_value(&message).unwrap();

        assert_eq!(doc["sender"], "conn-1");
        assert_eq!(doc["content"], "hello");
        assert!(doc["time"].is_string());
        // Unsaved messages carry no id
        assert!(doc.get("_id").is_none());

        let id = Uuid::new_v4();
        let doc = serde_json::to_value(message.with_id(id)).unwrap();
        assert_eq!(doc["_id"], serde_json::json!(id.to_string()));
    }
}
