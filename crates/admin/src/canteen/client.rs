//! Staff-side REST client implementation.

use std::sync::Arc;

use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use tiffin_core::{Order, OrderId, OrderItem, OrderStatus, Price, ProductId, Role, UserId};

use crate::config::AdminConfig;
use crate::models::CurrentAdmin;

use super::AdminCanteenError;

/// Result of a successful staff login.
#[derive(Debug, Clone)]
pub struct StaffLogin {
    pub token: String,
    pub role: Role,
    pub username: String,
    pub user_id: UserId,
}

#[derive(Debug, serde::Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    role: String,
    username: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<WireOrder>,
}

#[derive(Debug, Deserialize)]
struct DeliverResponse {
    order: WireOrder,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    id: String,
    #[serde(rename = "customerId")]
    customer_id: String,
    items: Vec<WireOrderItem>,
    total: f64,
    status: OrderStatus,
    #[serde(rename = "createdAt")]
    created_at: i64,
}

#[derive(Debug, Deserialize)]
struct WireOrderItem {
    #[serde(rename = "productId")]
    product_id: String,
    name: String,
    price: f64,
    quantity: u32,
}

/// Client for the backend's staff endpoints.
#[derive(Clone)]
pub struct AdminCanteenClient {
    inner: Arc<AdminCanteenClientInner>,
}

struct AdminCanteenClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AdminCanteenClient {
    /// Create a new staff API client.
    #[must_use]
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            inner: Arc::new(AdminCanteenClientInner {
                client: reqwest::Client::new(),
                base_url: config
                    .canteen_api_url
                    .as_str()
                    .trim_end_matches('/')
                    .to_string(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AdminCanteenError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AdminCanteenError::Unauthorized(error_message(&body)));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AdminCanteenError::NotFound(error_message(&body)));
        }
        if !status.is_success() {
            tracing::error!(
                status = %status,
                "canteen API returned non-success status"
            );
            return Err(AdminCanteenError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(AdminCanteenError::Parse)
    }

    /// Exchange staff credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<StaffLogin, AdminCanteenError> {
        let response: LoginResponse = self
            .execute(
                self.inner
                    .client
                    .post(self.url("/login"))
                    .json(&LoginRequest { email, password }),
            )
            .await?;

        let role = response
            .role
            .parse()
            .map_err(AdminCanteenError::InvalidPayload)?;

        Ok(StaffLogin {
            token: response.token,
            role,
            username: response.username,
            user_id: UserId::new(response.user_id),
        })
    }

    /// List every order in the system.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, admin))]
    pub async fn list_orders(&self, admin: &CurrentAdmin) -> Result<Vec<Order>, AdminCanteenError> {
        let response: OrdersResponse = self
            .execute(
                self.inner
                    .client
                    .get(self.url("/admin/orders"))
                    .bearer_auth(admin.token()),
            )
            .await?;
        response.orders.into_iter().map(convert_order).collect()
    }

    /// Mark a paid order as delivered.
    ///
    /// The caller is expected to have checked the order is `paid`; the
    /// backend rejects anything else as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, admin), fields(order_id = %order_id))]
    pub async fn mark_delivered(
        &self,
        admin: &CurrentAdmin,
        order_id: &OrderId,
    ) -> Result<Order, AdminCanteenError> {
        let path = format!("/admin/order/{order_id}/deliver");
        let response: DeliverResponse = self
            .execute(
                self.inner
                    .client
                    .patch(self.url(&path))
                    .bearer_auth(admin.token()),
            )
            .await?;
        convert_order(response.order)
    }
}

fn convert_order(order: WireOrder) -> Result<Order, AdminCanteenError> {
    let total_amount = Price::from_rupees_f64(order.total).ok_or_else(|| {
        AdminCanteenError::InvalidPayload(format!("bad total on order {}", order.id))
    })?;
    let created_at = DateTime::from_timestamp(order.created_at, 0).ok_or_else(|| {
        AdminCanteenError::InvalidPayload(format!("bad createdAt on order {}", order.id))
    })?;

    let items = order
        .items
        .into_iter()
        .map(|item| {
            let unit_price = Price::from_rupees_f64(item.price).ok_or_else(|| {
                AdminCanteenError::InvalidPayload(format!("bad price for {}", item.name))
            })?;
            Ok(OrderItem {
                product_id: ProductId::new(item.product_id),
                name: item.name,
                unit_price,
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, AdminCanteenError>>()?;

    Ok(Order {
        id: OrderId::new(order.id),
        user_id: UserId::new(order.customer_id),
        items,
        total_amount,
        status: order.status,
        created_at,
    })
}

/// Pull the `{"error": "..."}` message out of a backend error body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| body.chars().take(200).collect(), |parsed| parsed.error)
}
