//! Domain and wire types for the canteen backend API.
//!
//! The `Wire*` structs mirror the backend's JSON field names exactly and
//! stay inside this module; handlers only ever see the converted domain
//! types.

use serde::{Deserialize, Serialize};

use tiffin_core::{OrderId, OrderStatus, PaymentIntent, Price, ProductId, Role, UserId};

// =============================================================================
// Domain Types
// =============================================================================

/// A menu entry as shown to users.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Units currently in stock.
    pub available: i64,
}

/// Result of a successful backend login.
///
/// The token is opaque to Tiffin; it is stored in the session context and
/// replayed as a bearer header. Issuance and expiry are the backend's
/// business.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub role: Role,
    pub username: String,
    pub user_id: UserId,
}

/// A freshly created pending order with its payment intent.
#[derive(Debug, Clone)]
pub struct CheckoutIntent {
    pub order_id: OrderId,
    pub intent: PaymentIntent,
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub role: String,
    pub username: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddToCartRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartResponse {
    #[serde(default)]
    pub items: Vec<WireCartItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCartItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateOrderResponse {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "razorpayOrderID")]
    pub razorpay_order_id: String,
    /// Minor units (paise), as the gateway wants it.
    pub amount: i64,
    pub currency: String,
    /// Publishable gateway key for the widget.
    pub key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyRequest<'a> {
    #[serde(rename = "gatewayPaymentId")]
    pub gateway_payment_id: &'a str,
    #[serde(rename = "gatewayOrderId")]
    pub gateway_order_id: &'a str,
    pub signature: &'a str,
    #[serde(rename = "orderID")]
    pub order_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyResponse {
    pub status: String,
    pub order: WireOrder,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<WireOrder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireOrder {
    pub id: String,
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub items: Vec<WireOrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireOrderItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}
