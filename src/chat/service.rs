use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use socketioxide::extract::{Data, SocketRef};
use socketioxide::socket::DisconnectReason;
use socketioxide::SocketIo;
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::store::{MessageSink, SinkError};

use super::message::ChatMessage;

/// Event name used for chat messages in both directions
pub const MESSAGE_EVENT: &str = "message";
/// Event sent back to a client whose message could not be relayed
pub const ERROR_EVENT: &str = "error";

/// What happened to the broadcast step of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    Sent,
    Failed(String),
}

/// What happened to the persistence step of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// No sink configured
    Disabled,
    Stored(Uuid),
    Failed(String),
}

/// Result of relaying one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOutcome {
    pub broadcast: BroadcastOutcome,
    pub persisted: PersistOutcome,
}

#[derive(Debug, Default)]
struct ChatStats {
    connections_total: AtomicU64,
    connected: AtomicU64,
    messages_received: AtomicU64,
    invalid_payloads: AtomicU64,
    broadcast_failures: AtomicU64,
    persisted: AtomicU64,
    persist_failures: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatStatsSnapshot {
    pub connections_total: u64,
    pub connected: u64,
    pub messages_received: u64,
    pub invalid_payloads: u64,
    pub broadcast_failures: u64,
    pub persisted: u64,
    pub persist_failures: u64,
}

/// Single-room chat on a Socket.IO namespace: every socket joins one room and
/// every message is echoed to the whole room, then optionally persisted.
pub struct ChatService {
    io: SocketIo,
    sink: Option<Arc<dyn MessageSink>>,
    namespace: String,
    room: String,
    write_timeout: Duration,
    stats: ChatStats,
}

impl ChatService {
    pub fn new(
        io: SocketIo,
        sink: Option<Arc<dyn MessageSink>>,
        config: &ChatConfig,
        write_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            io,
            sink,
            namespace: config.namespace.clone(),
            room: config.room.clone(),
            write_timeout,
            stats: ChatStats::default(),
        })
    }

    /// Serve the chat namespace; from now on clients can connect to it
    pub fn start(self: &Arc<Self>) {
        let chat = self.clone();
        self.io
            .ns(self.namespace.clone(), move |socket: SocketRef| chat.on_connect(socket));

        tracing::info!(
            namespace = %self.namespace,
            room = %self.room,
            persistence = self.sink.as_ref().map(|s| s.backend_name()).unwrap_or("none"),
            "Chat service started"
        );
    }

    /// Drop the namespace, disconnecting every socket on it, and release the
    /// sink
    pub async fn stop(&self) {
        let connected = self.stats.connected.load(Ordering::Relaxed);
        self.io.delete_ns(self.namespace.as_str());

        if let Some(sink) = &self.sink {
            sink.close().await;
        }

        tracing::info!(closed_connections = connected, "Chat service stopped");
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_persistent(&self) -> bool {
        self.sink.is_some()
    }

    pub fn stats(&self) -> ChatStatsSnapshot {
        ChatStatsSnapshot {
            connections_total: self.stats.connections_total.load(Ordering::Relaxed),
            connected: self.stats.connected.load(Ordering::Relaxed),
            messages_received: self.stats.messages_received.load(Ordering::Relaxed),
            invalid_payloads: self.stats.invalid_payloads.load(Ordering::Relaxed),
            broadcast_failures: self.stats.broadcast_failures.load(Ordering::Relaxed),
            persisted: self.stats.persisted.load(Ordering::Relaxed),
            persist_failures: self.stats.persist_failures.load(Ordering::Relaxed),
        }
    }

    /// Runs once the socket has joined the namespace, never during the
    /// transport handshake
    fn on_connect(self: &Arc<Self>, socket: SocketRef) {
        self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
        self.stats.connected.fetch_add(1, Ordering::Relaxed);
        tracing::info!(socket_id = %socket.id, namespace = %self.namespace, "Connected");

        socket.join(self.room.clone());

        let chat = self.clone();
        socket.on(MESSAGE_EVENT, move |socket: SocketRef, Data(data): Data<Value>| {
            let chat = chat.clone();
            async move { chat.on_message(socket, data).await }
        });

        let chat = self.clone();
        socket.on_disconnect(move |socket: SocketRef, reason: DisconnectReason| {
            let chat = chat.clone();
            async move { chat.on_disconnect(socket, reason) }
        });
    }

    async fn on_message(&self, socket: SocketRef, data: Value) {
        match data {
            Value::String(payload) => {
                self.handle_message(&socket.id.to_string(), payload).await;
            }
            other => {
                self.stats.invalid_payloads.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(socket_id = %socket.id, payload = %other, "Message payload is not text");

                let error = serde_json::json!({
                    "code": "INVALID_PAYLOAD",
                    "message": "message payload must be a string",
                });
                if let Err(e) = socket.emit(ERROR_EVENT, &error) {
                    tracing::debug!(socket_id = %socket.id, error = %e, "Failed to send error event");
                }
            }
        }
    }

    fn on_disconnect(&self, socket: SocketRef, reason: DisconnectReason) {
        self.stats.connected.fetch_sub(1, Ordering::Relaxed);
        tracing::info!(socket_id = %socket.id, reason = ?reason, "Disconnected");
    }

    /// Broadcast a message to the room, then persist it.
    ///
    /// The broadcast never waits on persistence and a failed write does not
    /// affect delivery.
    #[tracing::instrument(
        name = "chat.message",
        skip(self, payload),
        fields(payload_len = payload.len())
    )]
    pub async fn handle_message(&self, sender: &str, payload: String) -> MessageOutcome {
        self.stats.messages_received.fetch_add(1, Ordering::Relaxed);
        tracing::info!(socket_id = %sender, message = %payload, "Message received");

        let broadcast = self.broadcast(&payload).await;
        if let BroadcastOutcome::Failed(reason) = &broadcast {
            self.stats.broadcast_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(socket_id = %sender, error = %reason, "Broadcast failed");
        }

        let persisted = match &self.sink {
            None => PersistOutcome::Disabled,
            Some(sink) => self.persist(sink.as_ref(), sender, payload).await,
        };

        MessageOutcome {
            broadcast,
            persisted,
        }
    }

    async fn broadcast(&self, payload: &str) -> BroadcastOutcome {
        let Some(operators) = self.io.of(self.namespace.as_str()) else {
            return BroadcastOutcome::Failed(format!("namespace {} is not served", self.namespace));
        };

        match operators.to(self.room.clone()).emit(MESSAGE_EVENT, payload).await {
            Ok(()) => BroadcastOutcome::Sent,
            Err(e) => BroadcastOutcome::Failed(e.to_string()),
        }
    }

    async fn persist(&self, sink: &dyn MessageSink, sender: &str, payload: String) -> PersistOutcome {
        let message = ChatMessage::new(sender, payload);

        let result = match tokio::time::timeout(self.write_timeout, sink.insert(&message)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(self.write_timeout.as_millis() as u64)),
        };

        match result {
            Ok(id) => {
                self.stats.persisted.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(socket_id = %sender, message_id = %id, "Message saved");
                PersistOutcome::Stored(id)
            }
            Err(e) => {
                self.stats.persist_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    socket_id = %sender,
                    backend = sink.backend_name(),
                    error = %e,
                    "Failed to save message"
                );
                PersistOutcome::Failed(e.to_string())
            }
        }
    }
}
