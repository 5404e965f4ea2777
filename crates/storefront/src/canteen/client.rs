//! Canteen backend REST client implementation.
//!
//! One `reqwest` client behind an `Arc`, cloned freely into handlers.
//! Read-only menu data is cached for 5 minutes; everything that touches a
//! cart or an order goes straight to the backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tiffin_core::{Cart, Order, OrderId, PaymentCaptureResult, ProductId, UserId};

use crate::config::CanteenApiConfig;
use crate::models::SessionContext;

use super::CanteenError;
use super::conversions::{convert_cart, convert_intent, convert_order, convert_product};
use super::types::{
    AddToCartRequest, CartResponse, CheckoutIntent, CreateOrderResponse, LoginRequest,
    LoginResponse, LoginSession, MenuItem, OrdersResponse, ProductsResponse, VerifyRequest,
    VerifyResponse,
};

const MENU_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes
const MENU_CACHE_KEY: &str = "menu";

/// Header carrying the caller-supplied idempotency token for order
/// creation and payment verification.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Client for the canteen backend REST API.
#[derive(Clone)]
pub struct CanteenClient {
    inner: Arc<CanteenClientInner>,
}

struct CanteenClientInner {
    client: reqwest::Client,
    base_url: String,
    menu_cache: Cache<String, Vec<MenuItem>>,
}

impl CanteenClient {
    /// Create a new backend API client.
    #[must_use]
    pub fn new(config: &CanteenApiConfig) -> Self {
        let menu_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(MENU_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CanteenClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                menu_cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder, ctx: &SessionContext) -> reqwest::RequestBuilder {
        builder.bearer_auth(ctx.token())
    }

    /// Execute a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CanteenError> {
        let response = request.send().await?;
        let status = response.status();

        // Get the body as text first for better error diagnostics
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(CanteenError::Unauthorized(error_message(&body)));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CanteenError::NotFound(error_message(&body)));
        }
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, 500),
                "canteen API returned non-success status"
            );
            return Err(CanteenError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, 500),
                "failed to parse canteen API response"
            );
            CanteenError::Parse(e)
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for bad credentials, or `InvalidPayload` if
    /// the backend reports a role this build does not know.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, CanteenError> {
        let response: LoginResponse = self
            .execute(
                self.inner
                    .client
                    .post(self.url("/login"))
                    .json(&LoginRequest { email, password }),
            )
            .await?;

        let role = response.role.parse().map_err(CanteenError::InvalidPayload)?;

        Ok(LoginSession {
            token: response.token,
            role,
            username: response.username,
            user_id: UserId::new(response.user_id),
        })
    }

    // =========================================================================
    // Menu
    // =========================================================================

    /// Get the menu (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx))]
    pub async fn menu(&self, ctx: &SessionContext) -> Result<Vec<MenuItem>, CanteenError> {
        if let Some(menu) = self.inner.menu_cache.get(MENU_CACHE_KEY).await {
            debug!("Cache hit for menu");
            return Ok(menu);
        }

        let response: ProductsResponse = self
            .execute(self.authed(self.inner.client.get(self.url("/products")), ctx))
            .await?;

        let menu = response
            .products
            .into_iter()
            .map(convert_product)
            .collect::<Result<Vec<_>, _>>()?;

        self.inner
            .menu_cache
            .insert(MENU_CACHE_KEY.to_string(), menu.clone())
            .await;

        Ok(menu)
    }

    // =========================================================================
    // Cart (not cached - mutable state)
    // =========================================================================

    /// Fetch the user's cart. Prices are whatever the backend says now.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn cart(&self, ctx: &SessionContext) -> Result<Cart, CanteenError> {
        let response: CartResponse = self
            .execute(self.authed(self.inner.client.get(self.url("/user/cart")), ctx))
            .await?;
        convert_cart(response)
    }

    /// Add units of a product to the cart (aggregates per product).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, including when the
    /// requested quantity exceeds the available stock.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn add_to_cart(
        &self,
        ctx: &SessionContext,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CanteenError> {
        let path = format!("/addtocart/{product_id}/{}", ctx.user_id);
        let _: serde_json::Value = self
            .execute(
                self.authed(self.inner.client.post(self.url(&path)), ctx)
                    .json(&AddToCartRequest { quantity }),
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Orders & Payment
    // =========================================================================

    /// Create a pending order from the server-side cart, plus a gateway
    /// payment intent for its total.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails (including the backend's
    /// rejection of an empty cart).
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn create_order(
        &self,
        ctx: &SessionContext,
        idempotency_key: &str,
    ) -> Result<CheckoutIntent, CanteenError> {
        let response: CreateOrderResponse = self
            .execute(
                self.authed(self.inner.client.post(self.url("/user/order")), ctx)
                    .header(IDEMPOTENCY_KEY_HEADER, idempotency_key),
            )
            .await?;
        Ok(convert_intent(response))
    }

    /// Submit a capture result for server-side signature verification.
    ///
    /// The backend is the authority here: it checks the gateway signature
    /// and moves the order out of `pending`. Retried calls must reuse the
    /// same `idempotency_key`.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the backend rejects the capture (signature or
    /// amount mismatch), `Http` when the outcome is unknown.
    #[instrument(skip(self, ctx, capture), fields(order_id = %order_id))]
    pub async fn verify_payment(
        &self,
        ctx: &SessionContext,
        order_id: &OrderId,
        capture: &PaymentCaptureResult,
        idempotency_key: &str,
    ) -> Result<Order, CanteenError> {
        let request = VerifyRequest {
            gateway_payment_id: capture.gateway_payment_id.as_str(),
            gateway_order_id: capture.gateway_order_id.as_str(),
            signature: &capture.signature,
            order_id: order_id.as_str(),
        };

        let response: VerifyResponse = self
            .execute(
                self.authed(self.inner.client.post(self.url("/user/payment/verify")), ctx)
                    .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
                    .json(&request),
            )
            .await?;

        debug!(status = %response.status, "payment verification response");
        convert_order(response.order)
    }

    /// List the user's finalized orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn order_history(&self, ctx: &SessionContext) -> Result<Vec<Order>, CanteenError> {
        let response: OrdersResponse = self
            .execute(self.authed(self.inner.client.get(self.url("/user/order/history")), ctx))
            .await?;
        response.orders.into_iter().map(convert_order).collect()
    }
}

fn truncate(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

/// Pull the `{"error": "..."}` message out of a backend error body, or
/// fall back to the raw (truncated) text.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| truncate(body, 200), |parsed| parsed.error)
}
