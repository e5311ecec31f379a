mod settings;

pub use settings::{
    ChatConfig, LogConfig, LogFormat, OtelConfig, PersistenceBackend, PersistenceConfig,
    RelayConfig, ServerConfig, Settings,
};
