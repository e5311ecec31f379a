mod app;
mod state;

pub use app::create_app;
pub use state::AppState;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::error::AppError;
use crate::store::{create_message_sink, MessageSink};

/// A fully wired relay, ready to serve
pub struct Application {
    state: AppState,
}

impl Application {
    /// Connect the configured persistence sink and start the chat service.
    ///
    /// Fails when the configured store cannot be reached; no listener is
    /// bound at this point.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let sink = create_message_sink(&settings.persistence).await?;
        Ok(Self::with_sink(settings, sink))
    }

    /// Start the chat service on top of an already connected sink
    pub fn with_sink(settings: Settings, sink: Option<Arc<dyn MessageSink>>) -> Self {
        let state = AppState::new(settings, sink);
        state.chat.start();
        tracing::info!("Application state initialized");

        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The HTTP handler, for hosts that drive the service themselves
    pub fn router(&self) -> Router {
        create_app(self.state.clone())
    }

    /// Serve on `listener` until `signal` resolves, then disconnect every
    /// client and return.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let chat = self.state.chat.clone();
        let io = self.state.io.clone();
        let app = create_app(self.state);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                chat.stop().await;
                // Ends open websockets and pending polls so the server can drain
                io.close().await;
            })
            .await?;

        Ok(())
    }
}
