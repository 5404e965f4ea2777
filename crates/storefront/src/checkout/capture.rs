//! Payment capture bridge.
//!
//! The gateway widget runs in the user's browser; this broker is the
//! server-side half of that conversation. Initiating a checkout opens a
//! [`CaptureSession`]; the checkout page later posts the widget's result
//! (or an abandon notice) back, which resolves the session. Awaiting
//! [`CaptureSession::outcome`] is the suspension point of the workflow.
//!
//! Resolution consumes the session, so a capture result can be submitted
//! at most once per checkout - a replayed postback gets
//! [`SubmitError::UnknownSession`] instead of a second verification.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use tiffin_core::{OrderId, PaymentCaptureResult};

/// What the checkout page reports back for an open session.
#[derive(Debug)]
pub enum CaptureSubmission {
    /// The widget completed and produced a signed capture result.
    Completed(PaymentCaptureResult),
    /// The user dismissed the widget without paying.
    Abandoned,
    /// The page could not load the gateway script.
    SdkLoadFailed,
}

/// How a capture session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Completed(PaymentCaptureResult),
    Abandoned,
    SdkLoadFailed,
    /// Nothing came back before the configured deadline.
    TimedOut,
}

/// Errors resolving a capture session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// No session is open for this order: it never existed, already
    /// resolved, or timed out.
    #[error("no open capture session for order {0}")]
    UnknownSession(OrderId),
}

/// Registry of open capture sessions, keyed by order.
#[derive(Clone, Default, Debug)]
pub struct CaptureBroker {
    pending: Arc<Mutex<HashMap<OrderId, oneshot::Sender<CaptureSubmission>>>>,
}

impl CaptureBroker {
    fn lock(&self) -> MutexGuard<'_, HashMap<OrderId, oneshot::Sender<CaptureSubmission>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a capture session for an order.
    ///
    /// Opening a second session for the same order drops the first
    /// sender, resolving the older session as abandoned. The initiator's
    /// per-user lock means this only happens if an order ID is reused.
    #[must_use]
    pub fn open(&self, order_id: OrderId) -> CaptureSession {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(order_id.clone(), tx);
        CaptureSession {
            order_id,
            rx,
            broker: self.clone(),
        }
    }

    /// Resolve an open session. Consumes it: at most one submission per
    /// session ever reaches the awaiting workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::UnknownSession`] if no session is open for
    /// the order, or if the awaiting side already went away.
    pub fn submit(
        &self,
        order_id: &OrderId,
        submission: CaptureSubmission,
    ) -> Result<(), SubmitError> {
        let sender = self
            .lock()
            .remove(order_id)
            .ok_or_else(|| SubmitError::UnknownSession(order_id.clone()))?;
        sender
            .send(submission)
            .map_err(|_| SubmitError::UnknownSession(order_id.clone()))
    }

    fn discard(&self, order_id: &OrderId) {
        self.lock().remove(order_id);
    }
}

/// One open payment widget session, awaited by the checkout workflow.
#[derive(Debug)]
pub struct CaptureSession {
    order_id: OrderId,
    rx: oneshot::Receiver<CaptureSubmission>,
    broker: CaptureBroker,
}

impl CaptureSession {
    /// The order this session belongs to.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Wait for the widget to report back, up to `deadline`.
    ///
    /// On timeout the session is deregistered, so a late postback is
    /// rejected rather than verified against a workflow nobody awaits.
    pub async fn outcome(self, deadline: Duration) -> CaptureOutcome {
        let Self {
            order_id,
            rx,
            broker,
        } = self;

        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(CaptureSubmission::Completed(result))) => CaptureOutcome::Completed(result),
            Ok(Ok(CaptureSubmission::Abandoned)) => CaptureOutcome::Abandoned,
            Ok(Ok(CaptureSubmission::SdkLoadFailed)) => CaptureOutcome::SdkLoadFailed,
            // Sender gone without a submission: the broker replaced or
            // discarded this session.
            Ok(Err(_)) => CaptureOutcome::Abandoned,
            Err(_elapsed) => {
                broker.discard(&order_id);
                CaptureOutcome::TimedOut
            }
        }
    }
}
