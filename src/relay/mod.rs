//! Socket.IO relay layer.
//!
//! Handshake, transports (long-polling and websocket with in-place upgrade),
//! heartbeats and rooms are handled by `socketioxide`; this module maps the
//! relay settings onto its builder. The chat behaviour is attached to a
//! namespace by [`crate::chat::ChatService::start`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use socketioxide::{layer::SocketIoLayer, SocketIo, TransportType};

use crate::config::RelayConfig;

/// Transport a client may use to reach the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Polling,
    Websocket,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polling => f.write_str("polling"),
            Self::Websocket => f.write_str("websocket"),
        }
    }
}

impl From<TransportKind> for TransportType {
    fn from(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Polling => TransportType::Polling,
            TransportKind::Websocket => TransportType::Websocket,
        }
    }
}

/// Build the Socket.IO tower layer and its handle from the relay settings.
///
/// The layer intercepts every request under `config.path`; the returned
/// [`SocketIo`] is used to register namespaces and broadcast.
pub fn build_socket_layer(config: &RelayConfig) -> (SocketIoLayer, SocketIo) {
    let builder = SocketIo::builder()
        .req_path(config.path.clone())
        .ping_interval(Duration::from_secs(config.heartbeat_interval))
        .ping_timeout(Duration::from_secs(config.connection_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .max_payload(config.max_payload_bytes)
        .max_buffer_size(config.max_buffer_size);

    // Both transports are enabled unless one is left out
    let builder = match (
        config.allows(TransportKind::Polling),
        config.allows(TransportKind::Websocket),
    ) {
        (true, false) => builder.transports([TransportKind::Polling.into()]),
        (false, true) => builder.transports([TransportKind::Websocket.into()]),
        _ => builder,
    };

    tracing::info!(
        path = %config.path,
        transports = ?config.transports,
        ping_interval_secs = config.heartbeat_interval,
        ping_timeout_secs = config.connection_timeout,
        max_payload_bytes = config.max_payload_bytes,
        "Socket.IO layer configured"
    );

    builder.build_layer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_conversion() {
        assert!(matches!(
            TransportType::from(TransportKind::Polling),
            TransportType::Polling
        ));
        assert!(matches!(
            TransportType::from(TransportKind::Websocket),
            TransportType::Websocket
        ));
        assert_eq!(TransportKind::Websocket.to_string(), "websocket");
    }

    #[test]
    fn test_transport_kind_from_config_value() {
        let kinds: Vec<TransportKind> = serde_json::from_str(r#"["polling","websocket"]"#).unwrap();
        assert_eq!(kinds, vec![TransportKind::Polling, TransportKind::Websocket]);
    }

    #[tokio::test]
    async fn test_layer_builds_for_single_transport() {
        let config = RelayConfig {
            transports: vec![TransportKind::Websocket],
            ..Default::default()
        };
        let (_layer, io) = build_socket_layer(&config);
        // No namespace is served until the chat service registers one
        assert!(io.of("/").is_none());
    }
}
