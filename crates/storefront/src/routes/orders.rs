//! Order history route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use tiffin_core::Order;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order history response.
#[derive(Debug, Serialize)]
pub struct OrderHistoryView {
    pub orders: Vec<Order>,
}

/// List the user's orders, newest data straight from the backend.
///
/// Orders whose recorded total does not match their items are dropped
/// from the view rather than shown with numbers that cannot be trusted.
#[instrument(skip(state, ctx))]
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<OrderHistoryView>> {
    let orders = state.canteen().order_history(&ctx).await?;

    let (orders, corrupt): (Vec<_>, Vec<_>) = orders.into_iter().partition(Order::is_consistent);
    for order in &corrupt {
        tracing::error!(
            order_id = %order.id,
            "order total does not match its items; dropping from view"
        );
    }

    Ok(Json(OrderHistoryView { orders }))
}
