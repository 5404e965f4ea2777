//! Conversions from backend wire types to domain types.
//!
//! All price fields arrive as JSON numbers; conversion is fallible so a
//! corrupt payload surfaces as [`CanteenError::InvalidPayload`] instead
//! of a silently wrong amount.

use chrono::DateTime;

use tiffin_core::{
    Cart, CartItem, GatewayOrderId, Order, OrderId, OrderItem, PaymentIntent, Price, ProductId,
    UserId,
};

use super::CanteenError;
use super::types::{
    CartResponse, CheckoutIntent, CreateOrderResponse, MenuItem, WireOrder, WireOrderItem,
    WireProduct,
};

fn convert_price(rupees: f64, context: &str) -> Result<Price, CanteenError> {
    Price::from_rupees_f64(rupees)
        .ok_or_else(|| CanteenError::InvalidPayload(format!("bad price {rupees} for {context}")))
}

pub(crate) fn convert_product(product: WireProduct) -> Result<MenuItem, CanteenError> {
    let price = convert_price(product.price, &product.name)?;
    Ok(MenuItem {
        id: ProductId::new(product.id),
        name: product.name,
        description: product.description,
        price,
        available: product.quantity,
    })
}

pub(crate) fn convert_cart(response: CartResponse) -> Result<Cart, CanteenError> {
    let items = response
        .items
        .into_iter()
        .map(|item| {
            let price = convert_price(item.price, &item.name)?;
            CartItem::new(ProductId::new(item.product_id), item.name, price, item.quantity)
                .map_err(|e| CanteenError::InvalidPayload(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Cart { items })
}

pub(crate) fn convert_order_item(item: WireOrderItem) -> Result<OrderItem, CanteenError> {
    let unit_price = convert_price(item.price, &item.name)?;
    Ok(OrderItem {
        product_id: ProductId::new(item.product_id),
        name: item.name,
        unit_price,
        quantity: item.quantity,
    })
}

pub(crate) fn convert_order(order: WireOrder) -> Result<Order, CanteenError> {
    let total_amount = convert_price(order.total, &order.id)?;
    let created_at = DateTime::from_timestamp(order.created_at, 0).ok_or_else(|| {
        CanteenError::InvalidPayload(format!(
            "bad createdAt {} on order {}",
            order.created_at, order.id
        ))
    })?;
    Ok(Order {
        id: OrderId::new(order.id),
        user_id: UserId::new(order.customer_id),
        items: order
            .items
            .into_iter()
            .map(convert_order_item)
            .collect::<Result<Vec<_>, _>>()?,
        total_amount,
        status: order.status,
        created_at,
    })
}

pub(crate) fn convert_intent(response: CreateOrderResponse) -> CheckoutIntent {
    CheckoutIntent {
        order_id: OrderId::new(response.order_id),
        intent: PaymentIntent {
            gateway_order_id: GatewayOrderId::new(response.razorpay_order_id),
            amount_paise: response.amount,
            currency: response.currency,
            api_key: response.key,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiffin_core::OrderStatus;

    #[test]
    fn test_cart_wire_names() {
        let response: CartResponse = serde_json::from_str(
            r#"{"items":[{"productId":"p1","name":"Veg Sandwich","price":50.0,"quantity":2}]}"#,
        )
        .unwrap();
        let cart = convert_cart(response).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total(), Price::from_paise(10000));
    }

    #[test]
    fn test_cart_zero_quantity_is_invalid_payload() {
        let response: CartResponse = serde_json::from_str(
            r#"{"items":[{"productId":"p1","name":"Coffee","price":20.0,"quantity":0}]}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_cart(response),
            Err(CanteenError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_create_order_wire_names() {
        let response: CreateOrderResponse = serde_json::from_str(
            r#"{"orderID":"o1","razorpayOrderID":"order_N8vZ3","amount":12000,"currency":"INR","key":"rzp_test_k1"}"#,
        )
        .unwrap();
        let intent = convert_intent(response);
        assert_eq!(intent.order_id, OrderId::new("o1"));
        assert_eq!(intent.intent.amount_paise, 12000);
        assert_eq!(intent.intent.currency, "INR");
    }

    #[test]
    fn test_order_conversion() {
        let wire: WireOrder = serde_json::from_str(
            r#"{
                "id":"o1","customerId":"u1",
                "items":[{"productId":"p1","name":"Veg Sandwich","price":50.0,"quantity":2},
                         {"productId":"p2","name":"Coffee","price":20.0,"quantity":1}],
                "total":120.0,"status":"paid","createdAt":1735689600
            }"#,
        )
        .unwrap();
        let order = convert_order(wire).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.total_amount, Price::from_paise(12000));
        assert!(order.is_consistent());
    }

    #[test]
    fn test_order_bad_timestamp_rejected() {
        let wire: WireOrder = serde_json::from_str(&format!(
            r#"{{"id":"o1","customerId":"u1","items":[],"total":0.0,"status":"pending","createdAt":{}}}"#,
            i64::MAX
        ))
        .unwrap();
        assert!(matches!(
            convert_order(wire),
            Err(CanteenError::InvalidPayload(_))
        ));
    }
}
