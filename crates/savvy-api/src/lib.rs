pub mod auth;
pub mod error;
pub mod fanout;
pub mod push;
pub mod transactions;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use savvy_gateway::connection;

use crate::auth::AppState;

/// The full HTTP + live-channel surface. Layers (CORS, tracing) are the
/// binary's concern so tests can drive this router directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/push/subscribe", post(push::subscribe))
        .route(
            "/api/transactions",
            get(transactions::list_for_user).post(transactions::create),
        )
        .route("/api/transactions/all", get(transactions::list_all))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, hub))
}
