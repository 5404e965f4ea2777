//! Tests for the storefront's view of the backend: login, menu, cart
//! projection, and per-user order history.

use tiffin_core::{Price, ProductId, Role, UserId};
use tiffin_integration_tests::mock::{
    COFFEE, DINER_EMAIL, DINER_PASSWORD, DINER_TOKEN, DINER_USER_ID, MockCanteen, SANDWICH,
    SECOND_DINER_TOKEN, SECOND_DINER_USER_ID,
};
use tiffin_storefront::canteen::{CanteenClient, CanteenError};
use tiffin_storefront::config::CanteenApiConfig;
use tiffin_storefront::models::SessionContext;

fn client(mock: &MockCanteen) -> CanteenClient {
    CanteenClient::new(&CanteenApiConfig {
        base_url: mock.url(),
    })
}

fn diner() -> SessionContext {
    SessionContext::new(
        UserId::new(DINER_USER_ID),
        "asha".to_string(),
        Role::User,
        DINER_TOKEN.to_string(),
    )
}

fn second_diner() -> SessionContext {
    SessionContext::new(
        UserId::new(SECOND_DINER_USER_ID),
        "meera".to_string(),
        Role::User,
        SECOND_DINER_TOKEN.to_string(),
    )
}

const SCENARIO_ITEMS: &[(&str, &str, f64, u32)] = &[
    (SANDWICH, "Veg Sandwich", 50.0, 2),
    (COFFEE, "Coffee", 20.0, 1),
];

#[tokio::test]
async fn test_login_yields_role_and_token() {
    let mock = MockCanteen::spawn().await;
    let client = client(&mock);

    let login = client
        .login(DINER_EMAIL, DINER_PASSWORD)
        .await
        .expect("diner login");
    assert_eq!(login.role, Role::User);
    assert_eq!(login.user_id, UserId::new(DINER_USER_ID));
    assert!(!login.token.is_empty());

    let err = client
        .login(DINER_EMAIL, "not-the-password")
        .await
        .expect_err("bad credentials must fail");
    assert!(matches!(err, CanteenError::Unauthorized(_)));
}

#[tokio::test]
async fn test_menu_requires_authentication() {
    let mock = MockCanteen::spawn().await;
    let client = client(&mock);

    let menu = client.menu(&diner()).await.expect("menu");
    assert_eq!(menu.len(), 2);

    let forged = SessionContext::new(
        UserId::new(DINER_USER_ID),
        "asha".to_string(),
        Role::User,
        "tok-forged".to_string(),
    );
    // Cached menu is fine to serve, but a cart read must hit the backend.
    let err = client.cart(&forged).await.expect_err("forged token");
    assert!(matches!(err, CanteenError::Unauthorized(_)));
}

#[tokio::test]
async fn test_cart_projection_matches_backend_prices() {
    let mock = MockCanteen::spawn().await;
    let client = client(&mock);
    let ctx = diner();

    client
        .add_to_cart(&ctx, &ProductId::new(SANDWICH), 2)
        .await
        .expect("add sandwiches");
    client
        .add_to_cart(&ctx, &ProductId::new(COFFEE), 1)
        .await
        .expect("add coffee");

    let cart = client.cart(&ctx).await.expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total(), Price::from_paise(12_000));

    // Quantities aggregate per product instead of growing new lines.
    client
        .add_to_cart(&ctx, &ProductId::new(COFFEE), 1)
        .await
        .expect("one more coffee");
    let cart = client.cart(&ctx).await.expect("cart again");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total(), Price::from_paise(14_000));
}

#[tokio::test]
async fn test_add_to_cart_respects_stock() {
    let mock = MockCanteen::spawn().await;
    let client = client(&mock);
    let ctx = diner();

    let err = client
        .add_to_cart(&ctx, &ProductId::new(COFFEE), 99)
        .await
        .expect_err("stock is finite");
    assert!(matches!(err, CanteenError::Api { status: 400, .. }));
}

#[tokio::test]
async fn test_order_history_is_scoped_to_the_user() {
    let mock = MockCanteen::spawn().await;
    let client = client(&mock);

    let mine = mock.seed_order(DINER_USER_ID, "paid", SCENARIO_ITEMS);
    mock.seed_order(SECOND_DINER_USER_ID, "paid", SCENARIO_ITEMS);

    let orders = client.order_history(&diner()).await.expect("history");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id.as_str(), mine);
    assert_eq!(orders[0].user_id, UserId::new(DINER_USER_ID));
    assert!(orders[0].is_consistent());
    assert_eq!(orders[0].total_amount, Price::from_paise(12_000));

    let theirs = client.order_history(&second_diner()).await.expect("history");
    assert_eq!(theirs.len(), 1);
    assert_ne!(theirs[0].id.as_str(), mine);
}
