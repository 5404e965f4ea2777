//! HTTP route handlers for the staff panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Health check
//!
//! # Auth
//! POST /auth/login               - Staff login (admin role required)
//! POST /auth/logout              - Destroys the session
//!
//! # Orders
//! GET  /orders                   - All orders in the system
//! POST /orders/{id}/deliver      - Mark a paid order delivered
//! ```

pub mod auth;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}/deliver", post(orders::deliver))
}

/// Create all routes for the staff panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", order_routes())
        .nest("/auth", auth_routes())
}
