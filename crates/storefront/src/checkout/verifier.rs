//! Payment verification.
//!
//! The backend owns the gateway secret and is the authority on the
//! capture signature; this side's job is to deliver the capture result
//! exactly once and to classify the answer. Transport failures are
//! retried under the same idempotency key so the backend can deduplicate;
//! once retries are exhausted the outcome is reconciled by re-reading
//! order state, never by resubmitting the capture.

use std::time::Duration;

use tracing::{instrument, warn};
use uuid::Uuid;

use tiffin_core::{Order, OrderId, OrderStatus, PaymentCaptureResult};

use crate::canteen::CanteenError;
use crate::models::SessionContext;

use super::{CheckoutError, CheckoutService};

const RETRY_DELAY: Duration = Duration::from_millis(250);

impl CheckoutService {
    /// Verify a capture result against the backend.
    ///
    /// This is the only call in the workflow that can move an order out
    /// of `pending`; no other component mutates order status.
    #[instrument(skip(self, ctx, capture), fields(order_id = %order_id))]
    pub(super) async fn verify(
        &self,
        ctx: &SessionContext,
        order_id: &OrderId,
        capture: PaymentCaptureResult,
    ) -> Result<Order, CheckoutError> {
        // One key per capture result: every retry below must look like
        // the same request to the backend, never a fresh payment.
        let idempotency_key = Uuid::new_v4().to_string();

        let mut last_ambiguous = None;
        for attempt in 1..=self.inner.verify_attempts {
            match self
                .inner
                .canteen
                .verify_payment(ctx, order_id, &capture, &idempotency_key)
                .await
            {
                Ok(order) => return Ok(order),
                Err(err) if err.is_ambiguous_outcome() => {
                    warn!(
                        attempt,
                        error = %err,
                        "verification outcome unknown, retrying under the same idempotency key"
                    );
                    last_ambiguous = Some(err);
                    if attempt < self.inner.verify_attempts {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
                Err(CanteenError::Unauthorized(_)) => return Err(CheckoutError::Unauthorized),
                Err(err) => return Err(CheckoutError::Verification(err.to_string())),
            }
        }

        self.reconcile(ctx, order_id, last_ambiguous).await
    }

    /// The outcome of verification is unknown: decide from order state.
    async fn reconcile(
        &self,
        ctx: &SessionContext,
        order_id: &OrderId,
        last_ambiguous: Option<CanteenError>,
    ) -> Result<Order, CheckoutError> {
        match self.inner.canteen.order_history(ctx).await {
            Ok(orders) => {
                if let Some(order) = orders.into_iter().find(|order| &order.id == order_id) {
                    match order.status {
                        // A verification attempt did land.
                        OrderStatus::Paid | OrderStatus::Delivered => return Ok(order),
                        OrderStatus::Failed => {
                            return Err(CheckoutError::Verification(
                                "backend recorded the payment as failed".to_string(),
                            ));
                        }
                        OrderStatus::Pending => {}
                    }
                }
            }
            Err(err) => warn!(error = %err, "reconciliation read failed"),
        }

        Err(last_ambiguous.map_or_else(
            || CheckoutError::Verification("order did not settle".to_string()),
            CheckoutError::Network,
        ))
    }
}
