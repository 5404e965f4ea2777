//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Auth
//! POST /auth/login             - Backend login, creates session context
//! POST /auth/logout            - Destroys the session
//!
//! # Menu
//! GET  /menu                   - Menu listing
//!
//! # Cart
//! GET  /cart                   - Current cart with line totals
//! POST /cart/add               - Add units of a product
//! POST /cart/checkout          - Initiate checkout (pending order + intent)
//!
//! # Checkout
//! POST /checkout/capture       - Widget success postback
//! POST /checkout/abandon       - Widget dismissed / SDK load failure
//! GET  /checkout/{order_id}    - Poll the order's settlement status
//!
//! # Orders
//! GET  /orders/history         - The user's finalized orders
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(middleware::auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/checkout", post(checkout::start))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/capture", post(checkout::capture))
        .route("/abandon", post(checkout::abandon))
        .route("/{order_id}", get(checkout::status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(menu::index))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders/history", get(orders::history))
        .nest("/auth", auth_routes())
}
