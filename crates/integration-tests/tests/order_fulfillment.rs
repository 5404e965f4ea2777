//! End-to-end tests for staff order fulfillment.
//!
//! Drives the admin client against the mock backend: the order list and
//! the paid → delivered transition, including every state it must refuse.

use std::time::Duration;

use tiffin_admin::canteen::{AdminCanteenClient, AdminCanteenError};
use tiffin_admin::config::AdminConfig;
use tiffin_admin::models::CurrentAdmin;
use tiffin_core::{GatewayPaymentId, OrderId, OrderStatus, PaymentCaptureResult, ProductId, Role, UserId};
use tiffin_integration_tests::mock::{
    COFFEE, DINER_TOKEN, DINER_USER_ID, MockCanteen, SANDWICH, SECOND_DINER_USER_ID,
    STAFF_EMAIL, STAFF_PASSWORD, STAFF_TOKEN, STAFF_USER_ID,
};
use tiffin_storefront::canteen::CanteenClient;
use tiffin_storefront::checkout::{CaptureSubmission, CheckoutOutcome, CheckoutService};
use tiffin_storefront::config::{CanteenApiConfig, CheckoutConfig};
use tiffin_storefront::models::SessionContext;

fn admin_client(mock: &MockCanteen) -> AdminCanteenClient {
    AdminCanteenClient::new(&AdminConfig {
        host: "127.0.0.1".parse().expect("loopback addr parses"),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        canteen_api_url: mock.url(),
        sentry_dsn: None,
    })
}

fn staff() -> CurrentAdmin {
    CurrentAdmin::new(
        UserId::new(STAFF_USER_ID),
        "ravi".to_string(),
        STAFF_TOKEN.to_string(),
    )
}

const SCENARIO_ITEMS: &[(&str, &str, f64, u32)] = &[
    (SANDWICH, "Veg Sandwich", 50.0, 2),
    (COFFEE, "Coffee", 20.0, 1),
];

fn assert_conflict(err: &AdminCanteenError) {
    assert!(
        matches!(err, AdminCanteenError::Api { status: 409, .. }),
        "expected a conflict, got {err}"
    );
}

#[tokio::test]
async fn test_staff_login_returns_admin_role() {
    let mock = MockCanteen::spawn().await;
    let client = admin_client(&mock);

    let login = client
        .login(STAFF_EMAIL, STAFF_PASSWORD)
        .await
        .expect("staff login");
    assert_eq!(login.role, Role::Admin);

    let err = client
        .login(STAFF_EMAIL, "wrong-password")
        .await
        .expect_err("bad credentials must fail");
    assert!(matches!(err, AdminCanteenError::Unauthorized(_)));
}

#[tokio::test]
async fn test_order_list_shows_every_customer() {
    let mock = MockCanteen::spawn().await;
    let client = admin_client(&mock);

    let first = mock.seed_order(DINER_USER_ID, "paid", SCENARIO_ITEMS);
    let second = mock.seed_order(SECOND_DINER_USER_ID, "pending", SCENARIO_ITEMS);

    let orders = client.list_orders(&staff()).await.expect("list orders");
    assert_eq!(orders.len(), 2);

    let ids: Vec<&str> = orders.iter().map(|order| order.id.as_str()).collect();
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[tokio::test]
async fn test_delivery_is_only_valid_from_paid() {
    let mock = MockCanteen::spawn().await;
    let client = admin_client(&mock);
    let admin = staff();

    let pending = mock.seed_order(DINER_USER_ID, "pending", SCENARIO_ITEMS);
    let failed = mock.seed_order(DINER_USER_ID, "failed", SCENARIO_ITEMS);
    let paid = mock.seed_order(DINER_USER_ID, "paid", SCENARIO_ITEMS);

    let err = client
        .mark_delivered(&admin, &OrderId::new(pending.clone()))
        .await
        .expect_err("pending must not deliver");
    assert_conflict(&err);

    let err = client
        .mark_delivered(&admin, &OrderId::new(failed))
        .await
        .expect_err("failed must not deliver");
    assert_conflict(&err);

    let order = client
        .mark_delivered(&admin, &OrderId::new(paid.clone()))
        .await
        .expect("paid delivers");
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(mock.order_status(&paid).as_deref(), Some("delivered"));

    // Delivery is terminal; a second attempt is refused.
    let err = client
        .mark_delivered(&admin, &OrderId::new(paid))
        .await
        .expect_err("already delivered");
    assert_conflict(&err);

    // And the pending order never moved.
    assert_eq!(mock.order_status(&pending).as_deref(), Some("pending"));
}

/// The whole lifecycle across both binaries: a diner checks out and pays,
/// then staff marks the order delivered.
#[tokio::test]
async fn test_paid_checkout_can_be_fulfilled() {
    let mock = MockCanteen::spawn().await;

    let canteen = CanteenClient::new(&CanteenApiConfig {
        base_url: mock.url(),
    });
    let checkout = CheckoutService::new(
        canteen.clone(),
        &CheckoutConfig {
            widget_script_url: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
            capture_timeout: Duration::from_secs(5),
            verify_attempts: 3,
        },
    );
    let ctx = SessionContext::new(
        UserId::new(DINER_USER_ID),
        "asha".to_string(),
        Role::User,
        DINER_TOKEN.to_string(),
    );

    canteen
        .add_to_cart(&ctx, &ProductId::new(SANDWICH), 2)
        .await
        .expect("add sandwiches");

    let pending = checkout.initiate(&ctx).await.expect("initiate");
    let order_id = pending.order_id.clone();

    let gateway_order_id = mock
        .gateway_order_id(order_id.as_str())
        .expect("gateway order id");
    let capture = PaymentCaptureResult {
        gateway_payment_id: GatewayPaymentId::new("pay-42"),
        signature: MockCanteen::sign(&gateway_order_id, "pay-42"),
        gateway_order_id: gateway_order_id.into(),
    };
    checkout
        .submit(&order_id, CaptureSubmission::Completed(capture))
        .expect("submit capture");
    let outcome = checkout.finalize(&ctx, pending).await.expect("finalize");
    assert!(matches!(outcome, CheckoutOutcome::Paid(_)));

    let order = admin_client(&mock)
        .mark_delivered(&staff(), &order_id)
        .await
        .expect("deliver the paid order");
    assert_eq!(order.status, OrderStatus::Delivered);
}
