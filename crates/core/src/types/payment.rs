//! Ephemeral payment handshake types.
//!
//! Both types live only for the duration of one checkout attempt. Neither
//! is persisted by Tiffin: the intent is handed to the payment widget and
//! forgotten, the capture result is consumed exactly once by the
//! verification step.

use serde::{Deserialize, Serialize};

use crate::types::id::{GatewayOrderId, GatewayPaymentId};

/// Server-issued descriptor authorizing one gateway transaction.
///
/// Returned by the backend when an order is created. `amount_paise` is in
/// minor units per the gateway wire convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub gateway_order_id: GatewayOrderId,
    pub amount_paise: i64,
    /// ISO 4217 code, e.g. "INR".
    pub currency: String,
    /// Publishable gateway key the widget is opened with.
    pub api_key: String,
}

/// Gateway-signed confirmation that the user completed payment.
///
/// Produced by the payment widget; requires independent server-side
/// signature verification before any trust is placed in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCaptureResult {
    pub gateway_payment_id: GatewayPaymentId,
    pub gateway_order_id: GatewayOrderId,
    pub signature: String,
}
