//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// JSON 404 for unknown routes
async fn fallback_handler(uri: Uri) -> impl IntoResponse {
    let body = serde_json::json!({ "error": format!("Not Found: {}", uri.path()) });
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(body.to_string()),
    )
        .into_response()
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket notifications
        .route("/ws", get(ws_handler))
        // Reads
        .route("/api/token", get(handlers::get_token_info))
        .route("/api/balances/{account}", get(handlers::get_balance))
        .route(
            "/api/allowances/{owner}/{spender}",
            get(handlers::get_allowance),
        )
        .route("/api/events", get(handlers::list_events))
        // Mutations
        .route("/api/transfer", post(handlers::transfer))
        .route("/api/approve", post(handlers::approve))
        .route("/api/transfer_from", post(handlers::transfer_from))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(cors)
}

/// Route table printed at server start
pub fn endpoint_summary() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("GET", "/health", "Health check"),
        ("GET", "/ws", "WebSocket notifications"),
        ("GET", "/api/token", "Token info"),
        ("GET", "/api/balances/{account}", "Balance of an account"),
        ("GET", "/api/allowances/{owner}/{spender}", "Remaining allowance"),
        ("GET", "/api/events?since=N", "Notification log"),
        ("POST", "/api/transfer", "Transfer {caller, to, amount}"),
        ("POST", "/api/approve", "Approve {caller, spender, amount}"),
        (
            "POST",
            "/api/transfer_from",
            "Delegated transfer {caller, from, to, amount}",
        ),
    ]
}
