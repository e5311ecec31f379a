use std::sync::Arc;
use std::time::Duration;

use socketioxide::{layer::SocketIoLayer, SocketIo};

use crate::chat::ChatService;
use crate::config::Settings;
use crate::relay::build_socket_layer;
use crate::store::MessageSink;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub io: SocketIo,
    pub socket_layer: SocketIoLayer,
    pub chat: Arc<ChatService>,
}

impl AppState {
    /// Wire the Socket.IO layer and the chat service together.
    /// The chat service still has to be started.
    pub fn new(settings: Settings, sink: Option<Arc<dyn MessageSink>>) -> Self {
        let (socket_layer, io) = build_socket_layer(&settings.relay);
        let chat = ChatService::new(
            io.clone(),
            sink,
            &settings.chat,
            Duration::from_millis(settings.persistence.write_timeout_ms),
        );

        Self {
            settings: Arc::new(settings),
            io,
            socket_layer,
            chat,
        }
    }
}
