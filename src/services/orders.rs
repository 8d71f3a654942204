use crate::domain::models::{
    CancelReceipt, CartLine, CheckoutMethods, CreateOrderRequest, Order, OrderHistory,
    OrderItemRequest, OrderReceipt, PaymentMethodList, ShippingMethodList,
};
use crate::services::account::{signed_in_email, InputError};
use crate::services::cart::Cart;
use crate::services::http::ApiClient;
use crate::services::session::SessionStore;
use serde_json::json;

/// Order history, newest first as the backend returns it. `status` filters
/// by status name (case-insensitive) when given.
pub fn history(
    api: &ApiClient,
    session: &SessionStore,
    status: Option<&str>,
) -> anyhow::Result<Vec<Order>> {
    let email = signed_in_email(session)?;
    let h: OrderHistory = api.post("/order/history", &json!({ "user_email": email }))?;
    Ok(filter_by_status(h.orders, status))
}

fn filter_by_status(orders: Vec<Order>, status: Option<&str>) -> Vec<Order> {
    match status {
        None => orders,
        Some(s) => orders
            .into_iter()
            .filter(|o| o.status_name().eq_ignore_ascii_case(s))
            .collect(),
    }
}

pub fn detail(api: &ApiClient, order_id: i64) -> anyhow::Result<Order> {
    Ok(api.get(&format!("/order/{}", order_id), &[])?)
}

/// Only pending orders can be cancelled; the backend enforces that and
/// answers 400 otherwise.
pub fn cancel(api: &ApiClient, session: &SessionStore, order_id: i64) -> anyhow::Result<CancelReceipt> {
    let email = signed_in_email(session)?;
    Ok(api.post(
        "/order/cancel",
        &json!({ "order_id": order_id, "user_email": email }),
    )?)
}

pub fn checkout_methods(api: &ApiClient) -> anyhow::Result<CheckoutMethods> {
    let payments: PaymentMethodList = api.get("/api/payment-methods", &[])?;
    let shipping: ShippingMethodList = api.get("/api/shipping-methods", &[])?;
    Ok(CheckoutMethods {
        payment_methods: payments.payment_methods,
        shipping_methods: shipping.shipping_methods,
    })
}

pub fn order_request(
    email: String,
    lines: &[CartLine],
    payment_method_id: i64,
    shipping_method_id: i64,
) -> Result<CreateOrderRequest, InputError> {
    if lines.is_empty() {
        return Err(InputError("cart is empty".into()));
    }
    Ok(CreateOrderRequest {
        user_email: email,
        payment_method_id,
        shipping_method_id,
        items: lines
            .iter()
            .map(|l| OrderItemRequest {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
                price: l.unit_price(),
            })
            .collect(),
    })
}

/// Places an order for everything currently in the backend cart, then
/// empties the cart.
pub fn place_order(
    cart: &Cart<'_>,
    payment_method_id: i64,
    shipping_method_id: i64,
) -> anyhow::Result<OrderReceipt> {
    let methods = checkout_methods(cart.api)?;
    if !methods.payment_methods.iter().any(|m| m.id == payment_method_id) {
        anyhow::bail!(InputError(format!(
            "unknown payment method: {}",
            payment_method_id
        )));
    }
    if !methods.shipping_methods.iter().any(|m| m.id == shipping_method_id) {
        anyhow::bail!(InputError(format!(
            "unknown shipping method: {}",
            shipping_method_id
        )));
    }

    let lines = cart.display()?;
    let req = order_request(
        signed_in_email(cart.session)?,
        &lines,
        payment_method_id,
        shipping_method_id,
    )?;
    let receipt: OrderReceipt = cart.api.post("/api/create-order", &req)?;
    tracing::info!(order_id = receipt.order_id, "order placed");

    if let Err(e) = cart.remove_all() {
        tracing::warn!(error = %e, order_id = receipt.order_id, "order placed but cart not cleared");
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::{filter_by_status, order_request};
    use crate::domain::models::{CartLine, Order};
    use serde_json::json;

    fn order(id: i64, status: i64) -> Order {
        serde_json::from_value(json!({"order_id": id, "order_status_id": status})).unwrap()
    }

    #[test]
    fn status_filter_matches_names() {
        let orders = vec![order(1, 1), order(2, 5), order(3, 1)];
        let pending: Vec<i64> = filter_by_status(orders, Some("pending"))
            .iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(pending, vec![1, 3]);
    }

    #[test]
    fn order_request_uses_line_price_then_discount_price() {
        let lines: Vec<CartLine> = serde_json::from_value(json!([
            {"product_id": "B01", "quantity": 2, "price": "3.50"},
            {"product_id": "B02", "quantity": 1, "discount_price_usd": "9.99"}
        ]))
        .unwrap();
        let req = order_request("ana@example.com".into(), &lines, 1, 2).unwrap();
        assert_eq!(req.items.len(), 2);
        assert_eq!(req.items[0].price, 3.5);
        assert_eq!(req.items[1].price, 9.99);
        assert_eq!(req.items[0].quantity, 2);
    }

    #[test]
    fn empty_cart_cannot_be_ordered() {
        assert!(order_request("ana@example.com".into(), &[], 1, 1).is_err());
    }
}
