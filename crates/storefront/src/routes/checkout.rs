//! Checkout route handlers.
//!
//! `start` initiates the workflow and hands the page everything the
//! payment widget needs; the widget's own outcome comes back through
//! `capture` or `abandon`. The settlement itself runs in a background
//! task, so the page learns the final order state from `status`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use tiffin_core::{
    GatewayOrderId, GatewayPaymentId, OrderId, OrderStatus, PaymentCaptureResult,
};

use crate::checkout::{CaptureSubmission, CheckoutError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Everything the checkout page needs to open the payment widget.
#[derive(Debug, Serialize)]
pub struct CheckoutStartView {
    pub order_id: OrderId,
    pub gateway_order_id: GatewayOrderId,
    /// Minor units (paise).
    pub amount: i64,
    pub currency: String,
    pub api_key: String,
    pub script_url: String,
}

/// Widget success postback.
#[derive(Debug, Deserialize)]
pub struct CapturePostback {
    pub order_id: OrderId,
    pub gateway_payment_id: GatewayPaymentId,
    pub gateway_order_id: GatewayOrderId,
    pub signature: String,
}

/// Why the widget closed without a capture.
#[derive(Debug, Default, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    #[default]
    Dismissed,
    SdkLoadFailed,
}

/// Widget abandon postback.
#[derive(Debug, Deserialize)]
pub struct AbandonPostback {
    pub order_id: OrderId,
    #[serde(default)]
    pub reason: AbandonReason,
}

/// Settlement status of one checkout, for polling.
#[derive(Debug, Serialize)]
pub struct CheckoutStatusView {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Initiate checkout: pending order, payment intent, open capture session.
#[instrument(skip(state, ctx))]
pub async fn start(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<CheckoutStartView>> {
    let pending = state.checkout().initiate(&ctx).await?;

    let view = CheckoutStartView {
        order_id: pending.order_id.clone(),
        gateway_order_id: pending.intent.gateway_order_id.clone(),
        amount: pending.intent.amount_paise,
        currency: pending.intent.currency.clone(),
        api_key: pending.intent.api_key.clone(),
        script_url: state.config().checkout.widget_script_url.clone(),
    };

    // Settle in the background. Outcomes land in order state, which the
    // page polls; errors are logged (and captured) rather than lost.
    let service = state.checkout().clone();
    let order_id = pending.order_id.clone();
    tokio::spawn(async move {
        match service.finalize(&ctx, pending).await {
            Ok(outcome) => {
                tracing::info!(%order_id, outcome = outcome.label(), "checkout settled");
            }
            Err(err) => {
                tracing::error!(%order_id, error = %err, "checkout failed");
            }
        }
    });

    Ok(Json(view))
}

/// Widget success postback: feed the capture result to the workflow.
#[instrument(skip(state, _ctx, input), fields(order_id = %input.order_id))]
pub async fn capture(
    State(state): State<AppState>,
    RequireAuth(_ctx): RequireAuth,
    Json(input): Json<CapturePostback>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let result = PaymentCaptureResult {
        gateway_payment_id: input.gateway_payment_id,
        gateway_order_id: input.gateway_order_id,
        signature: input.signature,
    };

    state
        .checkout()
        .submit(&input.order_id, CaptureSubmission::Completed(result))
        .map_err(CheckoutError::from)?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))))
}

/// Widget abandon postback: close the capture session without a result.
#[instrument(skip(state, _ctx, input), fields(order_id = %input.order_id))]
pub async fn abandon(
    State(state): State<AppState>,
    RequireAuth(_ctx): RequireAuth,
    Json(input): Json<AbandonPostback>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let submission = match input.reason {
        AbandonReason::Dismissed => CaptureSubmission::Abandoned,
        AbandonReason::SdkLoadFailed => CaptureSubmission::SdkLoadFailed,
    };

    state
        .checkout()
        .submit(&input.order_id, submission)
        .map_err(CheckoutError::from)?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))))
}

/// Poll the settlement status of an order.
///
/// Reads order state; never touches the capture session, so polling can
/// never replay a payment.
#[instrument(skip(state, ctx))]
pub async fn status(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<CheckoutStatusView>> {
    let orders = state.canteen().order_history(&ctx).await?;
    let order = orders
        .into_iter()
        .find(|order| order.id == order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(Json(CheckoutStatusView {
        order_id: order.id,
        status: order.status,
    }))
}
