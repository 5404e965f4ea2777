//! Cart route handlers.
//!
//! The cart lives in the backend; these handlers are thin projections
//! over the client. Line and cart totals shown here are display values -
//! the authoritative total is computed server-side when checkout creates
//! the order.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tiffin_core::{Cart, CartItem, Price, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Price,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            total: cart.total(),
            items: cart.items.iter().map(CartItemView::from).collect(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Show the current cart.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = state.canteen().cart(&ctx).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add units of a product to the cart.
#[instrument(skip(state, ctx))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(form): Json<AddToCartForm>,
) -> Result<StatusCode> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    state
        .canteen()
        .add_to_cart(&ctx, &form.product_id, quantity)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
