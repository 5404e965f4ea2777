//! End-to-end tests for the checkout workflow.
//!
//! Each test spawns its own in-process mock backend and drives the real
//! storefront client and checkout service against it: order initiation,
//! the capture session, verification, and the recovery paths.

use std::time::Duration;

use tiffin_core::{GatewayPaymentId, OrderStatus, PaymentCaptureResult, ProductId, Role, UserId};
use tiffin_integration_tests::mock::{
    COFFEE, DINER_TOKEN, DINER_USER_ID, MockCanteen, SANDWICH,
};
use tiffin_storefront::canteen::CanteenClient;
use tiffin_storefront::checkout::{
    CaptureSubmission, CheckoutError, CheckoutOutcome, CheckoutService, SubmitError,
};
use tiffin_storefront::config::{CanteenApiConfig, CheckoutConfig};
use tiffin_storefront::models::SessionContext;

const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

fn checkout_config(capture_timeout: Duration) -> CheckoutConfig {
    CheckoutConfig {
        widget_script_url: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
        capture_timeout,
        verify_attempts: 3,
    }
}

fn storefront(mock: &MockCanteen, capture_timeout: Duration) -> (CanteenClient, CheckoutService) {
    let canteen = CanteenClient::new(&CanteenApiConfig {
        base_url: mock.url(),
    });
    let checkout = CheckoutService::new(canteen.clone(), &checkout_config(capture_timeout));
    (canteen, checkout)
}

fn diner() -> SessionContext {
    SessionContext::new(
        UserId::new(DINER_USER_ID),
        "asha".to_string(),
        Role::User,
        DINER_TOKEN.to_string(),
    )
}

/// The standard scenario cart: 2 sandwiches + 1 coffee = ₹120.
async fn fill_cart(canteen: &CanteenClient, ctx: &SessionContext) {
    canteen
        .add_to_cart(ctx, &ProductId::new(SANDWICH), 2)
        .await
        .expect("add sandwiches");
    canteen
        .add_to_cart(ctx, &ProductId::new(COFFEE), 1)
        .await
        .expect("add coffee");
}

fn signed_capture(mock: &MockCanteen, order_id: &str) -> PaymentCaptureResult {
    let gateway_order_id = mock
        .gateway_order_id(order_id)
        .expect("order has a gateway order id");
    let signature = MockCanteen::sign(&gateway_order_id, "pay-1");
    PaymentCaptureResult {
        gateway_payment_id: GatewayPaymentId::new("pay-1"),
        gateway_order_id: gateway_order_id.into(),
        signature,
    }
}

// =============================================================================
// Order Initiation
// =============================================================================

#[tokio::test]
async fn test_checkout_creates_one_pending_order_with_paise_total() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;

    let pending = checkout.initiate(&ctx).await.expect("initiate checkout");

    // ₹50 × 2 + ₹20 × 1 = ₹120 → 12000 paise, priced server-side.
    assert_eq!(pending.intent.amount_paise, 12_000);
    assert_eq!(pending.intent.currency, "INR");
    assert_eq!(mock.order_count(), 1);
    assert_eq!(
        mock.order_status(pending.order_id.as_str()).as_deref(),
        Some("pending")
    );
}

#[tokio::test]
async fn test_empty_cart_checkout_creates_no_order() {
    let mock = MockCanteen::spawn().await;
    let (_, checkout) = storefront(&mock, CAPTURE_TIMEOUT);

    let err = checkout
        .initiate(&diner())
        .await
        .expect_err("empty cart must fail");

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(mock.order_count(), 0);
}

#[tokio::test]
async fn test_second_checkout_while_one_is_in_flight_is_rejected() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;

    let pending = checkout.initiate(&ctx).await.expect("first initiate");

    // The double-clicked "Buy Now": no second pending order is minted.
    let err = checkout
        .initiate(&ctx)
        .await
        .expect_err("second initiate must fail");
    assert!(matches!(err, CheckoutError::CheckoutInFlight));
    assert_eq!(mock.order_count(), 1);

    // Settling the first checkout frees the slot.
    let order_id = pending.order_id.clone();
    checkout
        .submit(&order_id, CaptureSubmission::Abandoned)
        .expect("abandon");
    checkout.finalize(&ctx, pending).await.expect("finalize");

    checkout.initiate(&ctx).await.expect("slot released");
}

// =============================================================================
// Capture + Verification
// =============================================================================

#[tokio::test]
async fn test_capture_and_verify_transitions_order_to_paid() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    let capture = signed_capture(&mock, order_id.as_str());
    checkout
        .submit(&order_id, CaptureSubmission::Completed(capture))
        .expect("submit capture");

    let outcome = checkout.finalize(&ctx, pending).await.expect("finalize");
    let CheckoutOutcome::Paid(order) = outcome else {
        panic!("expected a paid outcome, got {outcome:?}");
    };

    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.is_consistent());
    assert_eq!(mock.order_status(order_id.as_str()).as_deref(), Some("paid"));
    assert_eq!(mock.paid_transitions(), 1);

    // Successful payment drains the cart backend-side.
    assert_eq!(mock.cart_len(DINER_USER_ID), 0);
}

#[tokio::test]
async fn test_replayed_verification_does_not_double_transition() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    let capture = signed_capture(&mock, order_id.as_str());
    checkout
        .submit(&order_id, CaptureSubmission::Completed(capture.clone()))
        .expect("submit capture");
    checkout.finalize(&ctx, pending).await.expect("finalize");

    // A replayed postback finds no open session to resolve.
    let replay = checkout.submit(&order_id, CaptureSubmission::Completed(capture.clone()));
    assert_eq!(replay, Err(SubmitError::UnknownSession(order_id.clone())));

    // Even hitting the backend again with the same capture is idempotent.
    let order = canteen
        .verify_payment(&ctx, &order_id, &capture, "replayed-key")
        .await
        .expect("replayed verify");
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(mock.paid_transitions(), 1);
}

#[tokio::test]
async fn test_tampered_signature_marks_order_failed() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    let mut capture = signed_capture(&mock, order_id.as_str());
    capture.signature = "deadbeef".to_string();
    checkout
        .submit(&order_id, CaptureSubmission::Completed(capture))
        .expect("submit capture");

    let err = checkout
        .finalize(&ctx, pending)
        .await
        .expect_err("tampered capture must fail");

    assert!(matches!(err, CheckoutError::Verification(_)));
    assert_eq!(
        mock.order_status(order_id.as_str()).as_deref(),
        Some("failed")
    );
    assert_eq!(mock.paid_transitions(), 0);
}

// =============================================================================
// Abandonment & Timeout
// =============================================================================

#[tokio::test]
async fn test_abandoned_widget_leaves_order_pending() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    checkout
        .submit(&order_id, CaptureSubmission::Abandoned)
        .expect("abandon");

    let outcome = checkout.finalize(&ctx, pending).await.expect("finalize");
    assert!(matches!(outcome, CheckoutOutcome::Abandoned { .. }));
    assert_eq!(
        mock.order_status(order_id.as_str()).as_deref(),
        Some("pending")
    );

    // Nothing was paid, so the cart survives.
    assert_eq!(mock.cart_len(DINER_USER_ID), 2);
}

#[tokio::test]
async fn test_sdk_load_failure_surfaces() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    checkout
        .submit(&order_id, CaptureSubmission::SdkLoadFailed)
        .expect("report sdk failure");

    let err = checkout
        .finalize(&ctx, pending)
        .await
        .expect_err("sdk failure must surface");
    assert!(matches!(err, CheckoutError::SdkLoad));
}

#[tokio::test]
async fn test_capture_timeout_leaves_order_pending_and_frees_the_slot() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, Duration::from_millis(50));
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    let outcome = checkout.finalize(&ctx, pending).await.expect("finalize");
    assert!(matches!(outcome, CheckoutOutcome::TimedOut { .. }));
    assert_eq!(
        mock.order_status(order_id.as_str()).as_deref(),
        Some("pending")
    );

    // A postback after the deadline is rejected, never verified.
    let late = checkout.submit(&order_id, CaptureSubmission::Abandoned);
    assert_eq!(late, Err(SubmitError::UnknownSession(order_id)));

    // And the user can start over.
    checkout.initiate(&ctx).await.expect("slot released");
}

// =============================================================================
// Verification Retries & Reconciliation
// =============================================================================

#[tokio::test]
async fn test_verify_retries_reuse_the_same_idempotency_key() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    // First two verify calls answer 503; the third lands.
    mock.set_verify_outages(2);

    let capture = signed_capture(&mock, order_id.as_str());
    checkout
        .submit(&order_id, CaptureSubmission::Completed(capture))
        .expect("submit capture");

    let outcome = checkout.finalize(&ctx, pending).await.expect("finalize");
    assert!(matches!(outcome, CheckoutOutcome::Paid(_)));

    let keys = mock.verify_keys(order_id.as_str());
    assert_eq!(keys.len(), 3);
    assert!(
        keys.windows(2).all(|pair| pair[0] == pair[1]),
        "every retry must carry the same idempotency key: {keys:?}"
    );
    assert_eq!(mock.paid_transitions(), 1);
}

#[tokio::test]
async fn test_exhausted_verify_outage_reconciles_instead_of_resubmitting() {
    let mock = MockCanteen::spawn().await;
    let (canteen, checkout) = storefront(&mock, CAPTURE_TIMEOUT);
    let ctx = diner();

    fill_cart(&canteen, &ctx).await;
    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    // Outage outlasts every attempt.
    mock.set_verify_outages(10);

    let capture = signed_capture(&mock, order_id.as_str());
    checkout
        .submit(&order_id, CaptureSubmission::Completed(capture))
        .expect("submit capture");

    let err = checkout
        .finalize(&ctx, pending)
        .await
        .expect_err("outcome stays unknown");

    // Ambiguous, not a rejection: the caller re-reads order state later.
    assert!(matches!(err, CheckoutError::Network(_)));
    assert_eq!(
        mock.order_status(order_id.as_str()).as_deref(),
        Some("pending")
    );

    // Exactly the configured attempts, one key, no fresh submissions.
    let keys = mock.verify_keys(order_id.as_str());
    assert_eq!(keys.len(), 3);
    assert!(keys.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(mock.paid_transitions(), 0);
}
