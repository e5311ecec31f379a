//! Message sink factory

use std::sync::Arc;

use crate::config::{PersistenceBackend, PersistenceConfig};

use super::memory::MemoryMessageStore;
use super::postgres::PostgresMessageStore;
use super::sink::{MessageSink, SinkError};

/// Create the message sink selected by configuration.
///
/// - `none`: persistence disabled, returns `Ok(None)`
/// - `memory`: an in-process [`MemoryMessageStore`]
/// - `postgres`: a connected [`PostgresMessageStore`]; failing to reach the
///   database is an error, and callers treat it as fatal
pub async fn create_message_sink(
    config: &PersistenceConfig,
) -> Result<Option<Arc<dyn MessageSink>>, SinkError> {
    match config.backend {
        PersistenceBackend::None => {
            tracing::info!("Message persistence disabled");
            Ok(None)
        }
        PersistenceBackend::Memory => {
            tracing::info!(backend = "memory", "Creating memory message store");
            Ok(Some(Arc::new(MemoryMessageStore::new())))
        }
        PersistenceBackend::Postgres => {
            tracing::info!(backend = "postgres", table = %config.table, "Creating PostgreSQL message store");
            let store = PostgresMessageStore::connect(config).await?;
            Ok(Some(Arc::new(store)))
        }
    }
}
