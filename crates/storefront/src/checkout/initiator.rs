//! Order initiation.
//!
//! Converts the current cart into a pending backend order and a payment
//! intent. The per-user in-flight lock means a double-clicked "Buy Now"
//! cannot mint two pending orders: the second attempt fails fast with
//! [`CheckoutError::CheckoutInFlight`] until the first settles.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::instrument;
use uuid::Uuid;

use tiffin_core::UserId;

use crate::canteen::CanteenError;
use crate::models::SessionContext;

use super::{CheckoutError, CheckoutService, PendingCheckout};

/// At most one outstanding payment intent per user.
#[derive(Clone, Default, Debug)]
pub(super) struct InFlightLocks {
    users: Arc<Mutex<HashSet<UserId>>>,
}

impl InFlightLocks {
    fn lock(&self) -> MutexGuard<'_, HashSet<UserId>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the user's checkout slot; `None` if already held.
    pub(super) fn acquire(&self, user_id: &UserId) -> Option<InFlightGuard> {
        if self.lock().insert(user_id.clone()) {
            Some(InFlightGuard {
                user_id: user_id.clone(),
                locks: self.clone(),
            })
        } else {
            None
        }
    }
}

/// Releases the user's checkout slot on drop.
#[derive(Debug)]
pub(super) struct InFlightGuard {
    user_id: UserId,
    locks: InFlightLocks,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.locks.lock().remove(&self.user_id);
    }
}

impl CheckoutService {
    /// Convert the cart into a pending order with a payment intent.
    ///
    /// The cart is re-read server-side here: whatever prices the client
    /// displayed, the backend prices the order. Exactly one pending order
    /// is created per successful call.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::CheckoutInFlight`] if this user already has an
    ///   open checkout
    /// - [`CheckoutError::EmptyCart`] if the cart has no items (no order
    ///   is created)
    /// - [`CheckoutError::Unauthorized`] if the backend rejects the token
    /// - [`CheckoutError::Upstream`] if cart fetch or order creation fail
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn initiate(&self, ctx: &SessionContext) -> Result<PendingCheckout, CheckoutError> {
        let lock = self
            .inner
            .locks
            .acquire(&ctx.user_id)
            .ok_or(CheckoutError::CheckoutInFlight)?;

        let cart = self.inner.canteen.cart(ctx).await.map_err(map_upstream)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let idempotency_key = Uuid::new_v4().to_string();
        let checkout = self
            .inner
            .canteen
            .create_order(ctx, &idempotency_key)
            .await
            .map_err(map_upstream)?;

        tracing::info!(
            order_id = %checkout.order_id,
            amount_paise = checkout.intent.amount_paise,
            "pending order created"
        );

        let session = self.inner.broker.open(checkout.order_id.clone());

        Ok(PendingCheckout {
            order_id: checkout.order_id,
            intent: checkout.intent,
            session,
            lock,
        })
    }
}

fn map_upstream(err: CanteenError) -> CheckoutError {
    match err {
        CanteenError::Unauthorized(_) => CheckoutError::Unauthorized,
        other => CheckoutError::Upstream(other),
    }
}
