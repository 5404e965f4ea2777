//! In-process mock of the canteen backend.
//!
//! Implements the REST surface the storefront and admin clients consume,
//! with the same authority semantics as the real backend: it prices
//! orders from its own cart state, verifies gateway signatures with the
//! key secret, finalizes idempotently, drains the cart on successful
//! payment, and only delivers paid orders.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Publishable gateway key handed out with payment intents.
pub const GATEWAY_KEY_ID: &str = "rzp_test_tiffin";
/// Gateway key secret; only the backend ever sees this.
pub const GATEWAY_KEY_SECRET: &str = "b64a0d9f5c2e41e8a7d3";

pub const DINER_EMAIL: &str = "asha@example.com";
pub const DINER_PASSWORD: &str = "paneer-puffs";
pub const DINER_USER_ID: &str = "u-diner-1";
pub const DINER_TOKEN: &str = "tok-diner-1";

pub const SECOND_DINER_USER_ID: &str = "u-diner-2";
pub const SECOND_DINER_TOKEN: &str = "tok-diner-2";

pub const STAFF_EMAIL: &str = "ravi@canteen.example";
pub const STAFF_PASSWORD: &str = "ledger-window";
pub const STAFF_USER_ID: &str = "u-staff-1";
pub const STAFF_TOKEN: &str = "tok-staff-1";

pub const SANDWICH: &str = "p-sandwich";
pub const COFFEE: &str = "p-coffee";

#[derive(Clone)]
struct MockUser {
    user_id: &'static str,
    username: &'static str,
    role: &'static str,
    token: &'static str,
    email: &'static str,
    password: &'static str,
}

const USERS: &[MockUser] = &[
    MockUser {
        user_id: DINER_USER_ID,
        username: "asha",
        role: "user",
        token: DINER_TOKEN,
        email: DINER_EMAIL,
        password: DINER_PASSWORD,
    },
    MockUser {
        user_id: SECOND_DINER_USER_ID,
        username: "meera",
        role: "user",
        token: SECOND_DINER_TOKEN,
        email: "meera@example.com",
        password: "filter-coffee",
    },
    MockUser {
        user_id: STAFF_USER_ID,
        username: "ravi",
        role: "admin",
        token: STAFF_TOKEN,
        email: STAFF_EMAIL,
        password: STAFF_PASSWORD,
    },
];

struct MockProduct {
    id: &'static str,
    name: &'static str,
    price: f64,
    stock: i64,
}

const PRODUCTS: &[MockProduct] = &[
    MockProduct {
        id: SANDWICH,
        name: "Veg Sandwich",
        price: 50.0,
        stock: 10,
    },
    MockProduct {
        id: COFFEE,
        name: "Coffee",
        price: 20.0,
        stock: 10,
    },
];

#[derive(Clone)]
struct MockOrderItem {
    product_id: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Clone)]
struct MockOrder {
    id: String,
    customer_id: String,
    gateway_order_id: String,
    items: Vec<MockOrderItem>,
    total: f64,
    status: String,
    created_at: i64,
}

/// Shared state behind the mock's handlers.
pub struct MockState {
    carts: Mutex<HashMap<String, Vec<(String, u32)>>>,
    orders: Mutex<Vec<MockOrder>>,
    next_order: AtomicU64,
    /// Verify calls left to answer with 503 before behaving normally.
    verify_outages: AtomicU32,
    /// Idempotency keys seen per order on the verify endpoint.
    verify_keys: Mutex<HashMap<String, Vec<String>>>,
    /// pending → paid transitions, to catch double finalization.
    paid_transitions: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running mock backend.
pub struct MockCanteen {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockCanteen {
    /// Start the mock on an ephemeral loopback port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind, which only happens when the
    /// test host has no loopback networking.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            carts: Mutex::new(HashMap::new()),
            orders: Mutex::new(Vec::new()),
            next_order: AtomicU64::new(1),
            verify_outages: AtomicU32::new(0),
            verify_keys: Mutex::new(HashMap::new()),
            paid_transitions: AtomicU32::new(0),
        });

        let app = router(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener has a local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend serve");
        });

        Self { addr, state }
    }

    /// Base URL for client configuration.
    ///
    /// # Panics
    ///
    /// Never panics in practice; the formatted loopback URL always parses.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("loopback URL parses")
    }

    /// Compute the gateway signature the backend expects for a capture.
    #[must_use]
    pub fn sign(gateway_order_id: &str, gateway_payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(GATEWAY_KEY_SECRET.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{gateway_order_id}|{gateway_payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// How many orders exist.
    #[must_use]
    pub fn order_count(&self) -> usize {
        lock(&self.state.orders).len()
    }

    /// Status of one order.
    #[must_use]
    pub fn order_status(&self, order_id: &str) -> Option<String> {
        lock(&self.state.orders)
            .iter()
            .find(|order| order.id == order_id)
            .map(|order| order.status.clone())
    }

    /// The gateway order ID minted for an order.
    #[must_use]
    pub fn gateway_order_id(&self, order_id: &str) -> Option<String> {
        lock(&self.state.orders)
            .iter()
            .find(|order| order.id == order_id)
            .map(|order| order.gateway_order_id.clone())
    }

    /// How many pending → paid transitions happened.
    #[must_use]
    pub fn paid_transitions(&self) -> u32 {
        self.state.paid_transitions.load(Ordering::SeqCst)
    }

    /// Answer the next `n` verify calls with 503.
    pub fn set_verify_outages(&self, n: u32) {
        self.state.verify_outages.store(n, Ordering::SeqCst);
    }

    /// Idempotency keys the verify endpoint saw for an order.
    #[must_use]
    pub fn verify_keys(&self, order_id: &str) -> Vec<String> {
        lock(&self.state.verify_keys)
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of lines in a user's cart.
    #[must_use]
    pub fn cart_len(&self, user_id: &str) -> usize {
        lock(&self.state.carts)
            .get(user_id)
            .map_or(0, Vec::len)
    }

    /// Seed an order directly, bypassing checkout.
    pub fn seed_order(
        &self,
        customer_id: &str,
        status: &str,
        items: &[(&str, &str, f64, u32)],
    ) -> String {
        let n = self.state.next_order.fetch_add(1, Ordering::SeqCst);
        let id = format!("order-{n}");
        let items: Vec<MockOrderItem> = items
            .iter()
            .map(|(product_id, name, price, quantity)| MockOrderItem {
                product_id: (*product_id).to_string(),
                name: (*name).to_string(),
                price: *price,
                quantity: *quantity,
            })
            .collect();
        let total = items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();
        lock(&self.state.orders).push(MockOrder {
            id: id.clone(),
            customer_id: customer_id.to_string(),
            gateway_order_id: format!("rzp-order-{n}"),
            items,
            total,
            status: status.to_string(),
            created_at: 1_735_689_600 + i64::try_from(n).unwrap_or(0),
        });
        id
    }
}

// =============================================================================
// Router & Handlers
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/products", get(products))
        .route("/addtocart/{product_id}/{user_id}", post(add_to_cart))
        .route("/user/cart", get(get_cart))
        .route("/user/order", post(create_order))
        .route("/user/payment/verify", post(verify_payment))
        .route("/user/order/history", get(history))
        .route("/admin/orders", get(admin_orders))
        .route("/admin/order/{id}/deliver", patch(deliver))
        .with_state(state)
}

type Reply = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "error": message })))
}

fn auth(headers: &HeaderMap) -> Result<&'static MockUser, Reply> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Authorization header required"))?;

    USERS
        .iter()
        .find(|user| user.token == token)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid token"))
}

fn order_json(order: &MockOrder) -> Value {
    json!({
        "id": order.id,
        "customerId": order.customer_id,
        "items": order.items.iter().map(|item| json!({
            "productId": item.product_id,
            "name": item.name,
            "price": item.price,
            "quantity": item.quantity,
        })).collect::<Vec<_>>(),
        "total": order.total,
        "status": order.status,
        "createdAt": order.created_at,
    })
}

async fn login(Json(body): Json<Value>) -> Reply {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    USERS
        .iter()
        .find(|user| user.email == email && user.password == password)
        .map_or_else(
            || error(StatusCode::UNAUTHORIZED, "Invalid username or password"),
            |user| {
                (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Login successful",
                        "token": user.token,
                        "role": user.role,
                        "username": user.username,
                        "user_id": user.user_id,
                    })),
                )
            },
        )
}

async fn products(headers: HeaderMap) -> Reply {
    if let Err(rejection) = auth(&headers) {
        return rejection;
    }
    (
        StatusCode::OK,
        Json(json!({
            "products": PRODUCTS.iter().map(|product| json!({
                "id": product.id,
                "name": product.name,
                "description": "",
                "price": product.price,
                "quantity": product.stock,
            })).collect::<Vec<_>>(),
        })),
    )
}

async fn add_to_cart(
    State(state): State<Arc<MockState>>,
    Path((product_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let user = match auth(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if user.role != "user" {
        return error(StatusCode::FORBIDDEN, "Only user can add products to cart");
    }

    let Some(product) = PRODUCTS.iter().find(|product| product.id == product_id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };

    let quantity = body.get("quantity").and_then(Value::as_u64).unwrap_or(0);
    let quantity = u32::try_from(quantity).unwrap_or(0);

    let mut carts = lock(&state.carts);
    let cart = carts.entry(user_id).or_default();
    let existing: u32 = cart
        .iter()
        .filter(|(id, _)| *id == product_id)
        .map(|(_, qty)| *qty)
        .sum();

    if i64::from(existing + quantity) > product.stock {
        return error(StatusCode::BAD_REQUEST, "Quantity exceeds available stock");
    }

    if let Some(line) = cart.iter_mut().find(|(id, _)| *id == product_id) {
        line.1 += quantity;
    } else {
        cart.push((product_id, quantity));
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Product added successfully" })),
    )
}

async fn get_cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    let user = match auth(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let carts = lock(&state.carts);
    let items: Vec<Value> = carts
        .get(user.user_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|(product_id, quantity)| {
            PRODUCTS
                .iter()
                .find(|product| product.id == *product_id)
                .map(|product| {
                    json!({
                        "productId": product.id,
                        "name": product.name,
                        "price": product.price,
                        "quantity": quantity,
                    })
                })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "items": items })))
}

async fn create_order(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    let user = match auth(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let carts = lock(&state.carts);
    let cart = carts.get(user.user_id).cloned().unwrap_or_default();
    drop(carts);

    if cart.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let items: Vec<MockOrderItem> = cart
        .iter()
        .filter_map(|(product_id, quantity)| {
            PRODUCTS
                .iter()
                .find(|product| product.id == *product_id)
                .map(|product| MockOrderItem {
                    product_id: product.id.to_string(),
                    name: product.name.to_string(),
                    price: product.price,
                    quantity: *quantity,
                })
        })
        .collect();
    let total: f64 = items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();

    let n = state.next_order.fetch_add(1, Ordering::SeqCst);
    let order = MockOrder {
        id: format!("order-{n}"),
        customer_id: user.user_id.to_string(),
        gateway_order_id: format!("rzp-order-{n}"),
        items,
        total,
        status: "pending".to_string(),
        created_at: 1_735_689_600 + i64::try_from(n).unwrap_or(0),
    };

    #[allow(clippy::cast_possible_truncation)]
    let amount_paise = (total * 100.0).round() as i64;

    let response = json!({
        "message": "Order created successfully",
        "orderID": order.id,
        "razorpayOrderID": order.gateway_order_id,
        "amount": amount_paise,
        "currency": "INR",
        "key": GATEWAY_KEY_ID,
    });

    lock(&state.orders).push(order);

    (StatusCode::OK, Json(response))
}

async fn verify_payment(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(rejection) = auth(&headers) {
        return rejection;
    }

    let order_id = body.get("orderID").and_then(Value::as_str).unwrap_or_default();
    let gateway_order_id = body
        .get("gatewayOrderId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let gateway_payment_id = body
        .get("gatewayPaymentId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let signature = body
        .get("signature")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if let Some(key) = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
    {
        lock(&state.verify_keys)
            .entry(order_id.to_string())
            .or_default()
            .push(key.to_string());
    }

    // Simulated outage window for retry tests.
    if state.verify_outages.load(Ordering::SeqCst) > 0 {
        state.verify_outages.fetch_sub(1, Ordering::SeqCst);
        return error(StatusCode::SERVICE_UNAVAILABLE, "temporarily unavailable");
    }

    let mut orders = lock(&state.orders);
    let Some(order) = orders.iter_mut().find(|order| order.id == order_id) else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };

    // Idempotent finalize: a replay of a settled order changes nothing.
    if order.status == "paid" {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ok", "order": order_json(order) })),
        );
    }
    if order.status != "pending" {
        return error(StatusCode::BAD_REQUEST, "order already finalized");
    }

    let expected = MockCanteen::sign(gateway_order_id, gateway_payment_id);
    if gateway_order_id != order.gateway_order_id || expected != signature {
        order.status = "failed".to_string();
        return error(StatusCode::BAD_REQUEST, "Invalid payment signature");
    }

    order.status = "paid".to_string();
    state.paid_transitions.fetch_add(1, Ordering::SeqCst);
    let customer_id = order.customer_id.clone();
    let response = (
        StatusCode::OK,
        Json(json!({ "status": "ok", "order": order_json(order) })),
    );
    drop(orders);

    // Successful payment drains the cart, backend-side.
    lock(&state.carts).remove(&customer_id);

    response
}

async fn history(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    let user = match auth(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let orders = lock(&state.orders);
    let mine: Vec<Value> = orders
        .iter()
        .filter(|order| order.customer_id == user.user_id)
        .map(order_json)
        .collect();

    (StatusCode::OK, Json(json!({ "orders": mine })))
}

async fn admin_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    let user = match auth(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if user.role != "admin" {
        return error(StatusCode::FORBIDDEN, "Access denied");
    }

    let orders = lock(&state.orders);
    let all: Vec<Value> = orders.iter().map(order_json).collect();
    (StatusCode::OK, Json(json!({ "orders": all })))
}

async fn deliver(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    let user = match auth(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if user.role != "admin" {
        return error(StatusCode::FORBIDDEN, "Access denied");
    }

    let mut orders = lock(&state.orders);
    let Some(order) = orders.iter_mut().find(|order| order.id == id) else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };

    if order.status != "paid" {
        return error(StatusCode::CONFLICT, "only paid orders can be delivered");
    }

    order.status = "delivered".to_string();
    (StatusCode::OK, Json(json!({ "order": order_json(order) })))
}
