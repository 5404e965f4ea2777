//! Order fulfillment handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use tiffin_core::{Order, OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Order list response.
#[derive(Debug, Serialize)]
pub struct OrderListView {
    pub orders: Vec<Order>,
}

/// Delivered-order response.
#[derive(Debug, Serialize)]
pub struct DeliveredView {
    pub order: Order,
}

/// List every order in the system.
#[instrument(skip(admin, state))]
pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<OrderListView>> {
    let orders = state.canteen().list_orders(&admin).await?;
    Ok(Json(OrderListView { orders }))
}

/// Mark an order delivered.
///
/// Delivery is the one transition staff own, and it only exists out of
/// `paid`: a pending order has not been paid for, a failed one never
/// will be, a delivered one already left the counter. The current status
/// is checked here before the backend is asked to move anything.
#[instrument(skip(admin, state), fields(order_id = %id))]
pub async fn deliver(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<DeliveredView>> {
    let orders = state.canteen().list_orders(&admin).await?;
    let order = orders
        .into_iter()
        .find(|order| order.id == id)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    match order.status {
        OrderStatus::Paid => {}
        OrderStatus::Pending => {
            return Err(AppError::Conflict(
                "order has not been paid for yet".to_string(),
            ));
        }
        OrderStatus::Failed => {
            return Err(AppError::Conflict(
                "payment for this order failed".to_string(),
            ));
        }
        OrderStatus::Delivered => {
            return Err(AppError::Conflict("order was already delivered".to_string()));
        }
    }

    debug_assert!(order.status.can_transition_to(OrderStatus::Delivered));

    let order = state.canteen().mark_delivered(&admin, &id).await?;
    tracing::info!(order_id = %id, "order marked delivered");

    Ok(Json(DeliveredView { order }))
}
