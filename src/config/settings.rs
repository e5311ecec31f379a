use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::relay::TransportKind;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub chat: ChatConfig,
    pub persistence: PersistenceConfig,
    pub log: LogConfig,
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Path prefix the relay is mounted under
    pub path: String,
    /// Transports clients may use
    pub transports: Vec<TransportKind>,
    /// Interval between server pings, in seconds
    pub heartbeat_interval: u64,
    /// Time in seconds to wait for a pong before the connection is closed
    pub connection_timeout: u64,
    /// Time in seconds a client has to join a namespace after the handshake
    pub connect_timeout: u64,
    /// Outbound packet buffer per connection
    pub max_buffer_size: usize,
    /// Upper bound for POST bodies and websocket messages
    pub max_payload_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Socket.IO namespace the chat is served on
    pub namespace: String,
    pub room: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    None,
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: PersistenceBackend,
    /// Connection string, only read for the postgres backend
    pub url: Option<String>,
    /// Collection (table) the records are written to
    pub table: String,
    pub pool_size: u32,
    pub connect_timeout_seconds: u32,
    pub idle_timeout_seconds: u32,
    /// Upper bound for a single insert, in milliseconds
    pub write_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OtelConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub service_name: String,
    pub sampling_ratio: f64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CHAT_SERVER__PORT, CHAT_PERSISTENCE__URL, CHAT_RELAY__TRANSPORTS=polling,websocket
            .add_source(
                Environment::with_prefix("CHAT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("relay.transports")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let relay = &self.relay;
        if !relay.path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "relay.path must start with '/': {}",
                relay.path
            )));
        }
        if relay.transports.is_empty() {
            return Err(ConfigError::Message(
                "relay.transports must name at least one transport".into(),
            ));
        }
        for (name, value) in [
            ("relay.heartbeat_interval", relay.heartbeat_interval),
            ("relay.connection_timeout", relay.connection_timeout),
            ("relay.connect_timeout", relay.connect_timeout),
            ("relay.max_payload_bytes", relay.max_payload_bytes),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!("{} must be positive", name)));
            }
        }
        if relay.max_buffer_size == 0 {
            return Err(ConfigError::Message(
                "relay.max_buffer_size must be positive".into(),
            ));
        }
        // Durations are built from whole seconds; reject values that overflow in milliseconds
        if relay.heartbeat_interval.checked_mul(1000).is_none()
            || relay.connection_timeout.checked_mul(1000).is_none()
            || relay.connect_timeout.checked_mul(1000).is_none()
        {
            return Err(ConfigError::Message(
                "relay intervals are out of range".into(),
            ));
        }
        if !self.chat.namespace.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "chat.namespace must start with '/': {}",
                self.chat.namespace
            )));
        }
        if self.chat.room.is_empty() {
            return Err(ConfigError::Message("chat.room must not be empty".into()));
        }

        let persistence = &self.persistence;
        if persistence.backend == PersistenceBackend::Postgres && persistence.url.is_none() {
            return Err(ConfigError::Message(
                "persistence.url is required for the postgres backend".into(),
            ));
        }
        if !is_plain_identifier(&persistence.table) {
            return Err(ConfigError::Message(format!(
                "persistence.table is not a plain identifier: {}",
                persistence.table
            )));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_origins: vec![],
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: "/socket.io".to_string(),
            transports: vec![TransportKind::Polling, TransportKind::Websocket],
            heartbeat_interval: 25,
            connection_timeout: 20,
            connect_timeout: 45,
            max_buffer_size: 128,
            max_payload_bytes: 1_000_000,
        }
    }
}

impl RelayConfig {
    pub fn allows(&self, transport: TransportKind) -> bool {
        self.transports.contains(&transport)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            namespace: "/".to_string(),
            room: "chat".to_string(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::None,
            url: None,
            table: "messages".to_string(),
            pool_size: 5,
            connect_timeout_seconds: 5,
            idle_timeout_seconds: 300,
            write_timeout_ms: 5_000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:4317".to_string(),
            service_name: "chat-relay".to_string(),
            sampling_ratio: 1.0,
        }
    }
}
