use axum::{extract::OriginalUri, http::HeaderValue, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::error::AppError;

use super::AppState;

/// Build the HTTP front door. Everything under the relay path is answered by
/// the Socket.IO layer; any other request gets a JSON 404.
///
/// The returned router is a plain tower service, so it can be served by
/// `axum::serve` or handed to any hyper/tower host.
pub fn create_app(state: AppState) -> Router {
    let settings = state.settings.clone();

    let origins: Vec<HeaderValue> = settings
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Socket.IO enforces its own payload limit; the body limit guards the rest
    let body_limit = usize::try_from(settings.relay.max_payload_bytes).unwrap_or(usize::MAX);

    Router::new()
        .fallback(not_found)
        .layer(state.socket_layer.clone())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
