use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::error;

use aurabot_db::Database;
use aurabot_engine::Engine;
use aurabot_types::telegram::Update;

use crate::middleware::require_secret;
use crate::transport;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine<Database>>,
    pub bot_username: Option<Arc<str>>,
}

pub fn router(state: AppState, webhook_secret: &str) -> Router {
    let secret: Arc<str> = Arc::from(webhook_secret);

    let webhook = Router::new()
        .route("/webhook", post(webhook))
        .layer(middleware::from_fn_with_state(secret, require_secret))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

/// POST /webhook: one Telegram update in, at most one Bot API call back in
/// the response body. A failed command still answers 200 so Telegram does
/// not redeliver it.
async fn webhook(State(state): State<AppState>, Json(update): Json<Update>) -> Result<Response, StatusCode> {
    let Some(inbound) = transport::inbound(&update, state.bot_username.as_deref()) else {
        return Ok(StatusCode::OK.into_response());
    };

    // Run blocking DB work off the async runtime
    let engine = state.engine.clone();
    let events = inbound.events;
    let reply = tokio::task::spawn_blocking(move || {
        events
            .iter()
            .filter_map(|event| engine.handle(event))
            .last()
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(match reply {
        Some(reply) => Json(transport::webhook_reply(inbound.chat_id, reply)).into_response(),
        None => StatusCode::OK.into_response(),
    })
}
