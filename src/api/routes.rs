//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// JSON 404 for unknown routes
async fn fallback_handler(uri: axum::http::Uri) -> impl IntoResponse {
    log::debug!("No route for {}", uri.path());

    let mut response = Response::new(Body::from(r#"{"error":"Not Found"}"#));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

/// Create the API router with all routes
///
/// Callers are named in request bodies and are not authenticated. The owner
/// routes (`price`, `withdraw`, `ownership`) additionally require
/// `Authorization: Bearer <token>` when the state carries an admin token.
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket for real-time updates
        .route("/ws", get(ws_handler))
        // Registry
        .route("/api/launchpad", get(handlers::get_launchpad_info))
        .route("/api/events", get(handlers::get_events))
        // Tokens & listings
        .route(
            "/api/tokens",
            get(handlers::list_tokens).post(handlers::create_token),
        )
        .route("/api/tokens/{token}", get(handlers::get_listing))
        .route("/api/tokens/{token}/quote", get(handlers::get_quote))
        .route(
            "/api/tokens/{token}/history",
            get(handlers::get_token_history),
        )
        // Trading
        .route("/api/tokens/{token}/buy", post(handlers::buy_tokens))
        .route("/api/tokens/{token}/sell", post(handlers::sell_tokens))
        // Token ledger
        .route(
            "/api/tokens/{token}/balance/{holder}",
            get(handlers::get_token_balance),
        )
        .route(
            "/api/tokens/{token}/allowance",
            get(handlers::get_token_allowance),
        )
        .route(
            "/api/tokens/{token}/approve",
            post(handlers::approve_tokens),
        )
        .route(
            "/api/tokens/{token}/transfer",
            post(handlers::transfer_tokens),
        )
        .route(
            "/api/tokens/{token}/transferFrom",
            post(handlers::transfer_from_tokens),
        )
        // Admin
        .route("/api/tokens/{token}/price", post(handlers::update_price))
        .route("/api/withdraw", post(handlers::withdraw))
        .route("/api/ownership", post(handlers::transfer_ownership))
        // Native currency
        .route("/api/deposit", post(handlers::deposit))
        .route("/api/faucet", post(handlers::fund_account))
        .route(
            "/api/native/{account}",
            get(handlers::get_native_balance),
        )
        .fallback(fallback_handler)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
