//! Checkout workflow: order initiation, payment capture, verification.
//!
//! # Workflow
//!
//! 1. [`CheckoutService::initiate`] re-reads the server-side cart,
//!    creates a pending backend order with its payment intent, and opens
//!    a capture session (one per user at a time).
//! 2. The checkout page opens the gateway widget with the intent fields
//!    and posts the result back; [`CheckoutService::submit`] resolves the
//!    session at most once.
//! 3. [`CheckoutService::finalize`] awaits the session and, on a
//!    completed capture, runs server-side verification - the only step
//!    that moves an order out of `pending`.
//!
//! Order state itself lives in the backend:
//!
//! ```text
//! pending --(verify success)--> paid
//! pending --(verify failure)--> failed
//! paid --(staff marks fulfilled)--> delivered
//! ```
//!
//! Abandoned and timed-out sessions leave the order `pending`; the
//! backend sweeps those, Tiffin only reports them.

pub mod capture;
mod initiator;
mod verifier;

pub use capture::{CaptureBroker, CaptureOutcome, CaptureSession, CaptureSubmission, SubmitError};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use tiffin_core::{Order, OrderId, PaymentIntent};

use crate::canteen::{CanteenClient, CanteenError};
use crate::config::CheckoutConfig;
use crate::models::SessionContext;

use initiator::{InFlightGuard, InFlightLocks};

/// Errors surfaced by the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was initiated with nothing in the cart. No order exists.
    #[error("cart is empty")]
    EmptyCart,

    /// The backend no longer accepts the session's bearer token.
    #[error("not authenticated with the backend")]
    Unauthorized,

    /// This user already has an outstanding payment intent.
    #[error("a checkout is already in flight for this user")]
    CheckoutInFlight,

    /// The checkout page could not load the gateway script.
    #[error("payment SDK failed to load")]
    SdkLoad,

    /// Order or intent creation failed.
    #[error("order creation failed: {0}")]
    Upstream(#[source] CanteenError),

    /// The backend explicitly rejected the capture (signature or amount
    /// mismatch). The order is recorded as failed.
    #[error("payment verification rejected: {0}")]
    Verification(String),

    /// Transport failed and the verification outcome is unknown even
    /// after reconciliation. Never resubmit the capture; re-read order
    /// status instead.
    #[error("payment outcome unknown: {0}")]
    Network(#[source] CanteenError),

    /// A capture postback arrived for a session that is not open.
    #[error(transparent)]
    Capture(#[from] SubmitError),
}

/// How a finalized checkout ended.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Capture verified; the order is paid.
    Paid(Order),
    /// The user walked away from the widget. Order stays pending.
    Abandoned { order_id: OrderId },
    /// No result before the deadline. Order stays pending.
    TimedOut { order_id: OrderId },
}

impl CheckoutOutcome {
    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Paid(_) => "paid",
            Self::Abandoned { .. } => "abandoned",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}

/// A checkout that has a pending order and an open capture session.
///
/// Holds the user's in-flight slot until [`CheckoutService::finalize`]
/// consumes it (or it is dropped).
#[derive(Debug)]
pub struct PendingCheckout {
    pub order_id: OrderId,
    pub intent: PaymentIntent,
    session: CaptureSession,
    lock: InFlightGuard,
}

/// Orchestrates initiate → capture → verify.
#[derive(Clone)]
pub struct CheckoutService {
    inner: Arc<CheckoutServiceInner>,
}

struct CheckoutServiceInner {
    canteen: CanteenClient,
    broker: CaptureBroker,
    locks: InFlightLocks,
    capture_timeout: Duration,
    verify_attempts: u32,
}

impl CheckoutService {
    /// Create the checkout service.
    #[must_use]
    pub fn new(canteen: CanteenClient, config: &CheckoutConfig) -> Self {
        Self {
            inner: Arc::new(CheckoutServiceInner {
                canteen,
                broker: CaptureBroker::default(),
                locks: InFlightLocks::default(),
                capture_timeout: config.capture_timeout,
                verify_attempts: config.verify_attempts,
            }),
        }
    }

    /// Resolve the capture session for an order with the widget's result.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::UnknownSession`] for unknown, already
    /// resolved, or timed-out sessions.
    pub fn submit(
        &self,
        order_id: &OrderId,
        submission: CaptureSubmission,
    ) -> Result<(), SubmitError> {
        self.inner.broker.submit(order_id, submission)
    }

    /// Await the capture session and settle the checkout.
    ///
    /// Releases the user's in-flight slot when done, whatever the result.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SdkLoad`] if the page reported a script
    /// failure, [`CheckoutError::Verification`] if the backend rejected
    /// the capture, [`CheckoutError::Network`] if the outcome stayed
    /// unknown after retries and reconciliation.
    pub async fn finalize(
        &self,
        ctx: &SessionContext,
        pending: PendingCheckout,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let order_id = pending.order_id;
        // The in-flight guard lives until this function returns.
        let _lock = pending.lock;

        match pending.session.outcome(self.inner.capture_timeout).await {
            CaptureOutcome::Completed(result) => {
                let order = self.verify(ctx, &order_id, result).await?;
                Ok(CheckoutOutcome::Paid(order))
            }
            CaptureOutcome::Abandoned => {
                tracing::warn!(%order_id, "payment session abandoned; order stays pending");
                Ok(CheckoutOutcome::Abandoned { order_id })
            }
            CaptureOutcome::SdkLoadFailed => Err(CheckoutError::SdkLoad),
            CaptureOutcome::TimedOut => {
                tracing::warn!(%order_id, "payment session timed out; order stays pending");
                Ok(CheckoutOutcome::TimedOut { order_id })
            }
        }
    }
}
