//! Order history and order detail rendering.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::api::StorefrontApi;
use crate::checkout::order::{Order, OrderStats, OrderStatus};
use crate::error::CommerceError;
use crate::ids::OrderId;

/// The signed-in user's orders, as last fetched.
#[derive(Debug, Clone, Default)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders from the last [`list`](OrderHistory::list) call.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Fetch every order.
    pub async fn list(&mut self, api: &StorefrontApi) -> Result<&[Order], CommerceError> {
        self.orders = api.list_orders().await?;
        Ok(&self.orders)
    }

    /// Fetch one order and refresh it in the history.
    pub async fn get(&mut self, api: &StorefrontApi, id: &OrderId) -> Result<&Order, CommerceError> {
        let order = api.get_order(id).await?;
        Ok(self.upsert(order))
    }

    /// Cancel an order that has not shipped yet.
    ///
    /// The check runs against the latest copy from the server; a
    /// non-cancellable order is rejected without a status request.
    pub async fn cancel(&mut self, api: &StorefrontApi, id: &OrderId) -> Result<&Order, CommerceError> {
        let current = api.get_order(id).await?;
        if !current.can_cancel() {
            return Err(CommerceError::InvalidStatusTransition {
                action: "cancel",
                status: current.status.as_str().to_string(),
            });
        }

        let updated = api.update_order_status(id, OrderStatus::Cancelled).await?;
        tracing::info!(order_id = %id, "order cancelled");
        Ok(self.upsert(updated))
    }

    /// Request a return for an order delivered no more than 30 days before
    /// `now`. The order moves to `refunded`.
    pub async fn request_return(
        &mut self,
        api: &StorefrontApi,
        id: &OrderId,
        now: DateTime<Utc>,
    ) -> Result<&Order, CommerceError> {
        let current = api.get_order(id).await?;
        if !current.can_request_return(now) {
            return Err(CommerceError::InvalidStatusTransition {
                action: "return",
                status: current.status.as_str().to_string(),
            });
        }

        let updated = api.update_order_status(id, OrderStatus::Refunded).await?;
        tracing::info!(order_id = %id, "return requested");
        Ok(self.upsert(updated))
    }

    /// Order counts for the signed-in user.
    pub async fn stats(&self, api: &StorefrontApi) -> Result<OrderStats, CommerceError> {
        api.order_stats().await
    }

    fn upsert(&mut self, order: Order) -> &Order {
        match self.orders.iter().position(|o| o.id == order.id) {
            Some(index) => {
                self.orders[index] = order;
                &self.orders[index]
            }
            None => {
                self.orders.push(order);
                let index = self.orders.len() - 1;
                &self.orders[index]
            }
        }
    }
}

/// Text rendering of one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetailView {
    pub heading: String,
    pub status: String,
    pub tracking: Option<String>,
    pub address_lines: Vec<String>,
    pub item_lines: Vec<String>,
    /// `(label, amount)` rows, amounts to 2 decimals.
    pub summary_rows: Vec<(String, String)>,
}

impl OrderDetailView {
    pub fn new(order: &Order) -> Self {
        let item_lines = order
            .lines
            .iter()
            .map(|line| {
                let name = match line.variant.label() {
                    Some(label) => format!("{} ({})", line.name, label),
                    None => line.name.clone(),
                };
                format!(
                    "{} x {} @ {}",
                    name,
                    line.quantity,
                    line.unit_price.display()
                )
            })
            .collect();

        let summary = &order.summary;
        let mut summary_rows = vec![
            ("Subtotal".to_string(), summary.subtotal.display()),
            (
                "Shipping".to_string(),
                if summary.has_free_shipping() {
                    "Free".to_string()
                } else {
                    summary.shipping.display()
                },
            ),
            ("Tax".to_string(), summary.tax.display()),
        ];
        if summary.has_discount() {
            summary_rows.push(("Discount".to_string(), format!("-{}", summary.discount.display())));
        }
        summary_rows.push(("Total".to_string(), summary.total.display()));

        Self {
            heading: format!("Order #{}", order.order_number),
            status: order.status.display_name().to_string(),
            tracking: order.tracking_number.clone(),
            address_lines: order.shipping_address.lines(),
            item_lines,
            summary_rows,
        }
    }
}

impl fmt::Display for OrderDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "Status: {}", self.status)?;
        if let Some(tracking) = &self.tracking {
            writeln!(f, "Tracking: {}", tracking)?;
        }

        writeln!(f)?;
        writeln!(f, "Ship to:")?;
        for line in &self.address_lines {
            writeln!(f, "  {}", line)?;
        }

        writeln!(f)?;
        writeln!(f, "Items:")?;
        for line in &self.item_lines {
            writeln!(f, "  {}", line)?;
        }

        writeln!(f)?;
        let width = self.summary_rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        for (label, amount) in &self.summary_rows {
            writeln!(f, "{:<width$}  {}", label, amount, width = width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use shop_data::{FetchClient, Method, RecordingTransport};
    use std::sync::Arc;

    fn api(transport: &Arc<RecordingTransport>) -> StorefrontApi {
        StorefrontApi::new(FetchClient::new(Arc::clone(transport)), Currency::USD)
    }

    #[tokio::test]
    async fn test_cancel_shipped_order_rejected() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"order": {"id": 1, "status": "shipped"}}));
        let mut history = OrderHistory::new();

        let err = history
            .cancel(&api(&transport), &OrderId::new("1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel an order that is shipped");
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_pending_order() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"id": 1, "status": "pending"}));
        transport.push_json(200, json!({"order": {"id": 1, "status": "cancelled"}}));
        let mut history = OrderHistory::new();

        let order = history
            .cancel(&api(&transport), &OrderId::new("1"))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(transport.requests()[1].method(), Method::Patch);
        assert_eq!(history.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_return_window_enforced() {
        let delivered = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let order = json!({"id": 2, "status": "delivered", "deliveryDate": "2024-05-01T00:00:00Z"});

        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, order.clone());
        transport.push_json(200, order);
        transport.push_json(200, json!({"id": 2, "status": "refunded"}));
        let api = api(&transport);
        let mut history = OrderHistory::new();

        let late = history
            .request_return(&api, &OrderId::new("2"), delivered + Duration::days(45))
            .await;
        assert!(matches!(late, Err(CommerceError::InvalidStatusTransition { action: "return", .. })));

        let order = history
            .request_return(&api, &OrderId::new("2"), delivered + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
        let body: serde_json::Value = transport.requests()[2].json_body().unwrap();
        assert_eq!(body, json!({"status": "refunded"}));
    }

    #[tokio::test]
    async fn test_stats() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(
            200,
            json!({"stats": {"totalOrders": 4, "deliveredOrders": 2, "totalSpent": "1520.50"}}),
        );

        let stats = OrderHistory::new().stats(&api(&transport)).await.unwrap();
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.delivered_orders, 2);
        assert_eq!(stats.pending_orders, 0);
        assert!((stats.total_spent - 1520.5).abs() < 1e-9);
        assert_eq!(transport.requests()[0].url(), "/api/orders/stats");
    }

    #[test]
    fn test_detail_view() {
        let record: crate::checkout::OrderRecord = serde_json::from_value(json!({
            "id": 3,
            "orderNumber": "ORD-3",
            "status": "shipped",
            "trackingNumber": "TRK9",
            "items": [{"name": "Ring", "quantity": 2, "price": 199.5,
                       "variant": {"color": "Gold", "size": "7", "carat": "1.5ct"}}],
            "subtotal": 399, "shipping": 50, "tax": 31.92, "discount": 39.9, "total": 441.02,
            "shippingAddress": "\"{\\\"name\\\":\\\"A\\\",\\\"street\\\":\\\"B\\\"}\""
        }))
        .unwrap();
        let view = OrderDetailView::new(&record.into_order(Currency::USD));

        assert_eq!(view.heading, "Order #ORD-3");
        assert_eq!(view.status, "Shipped");
        assert_eq!(view.item_lines, vec!["Ring (Gold / 7 / 1.5ct) x 2 @ $199.50"]);
        assert_eq!(view.address_lines[0], "A");
        assert_eq!(view.address_lines[2], "N/A, N/A N/A");
        assert!(view
            .summary_rows
            .contains(&("Discount".to_string(), "-$39.90".to_string())));
        assert!(view
            .summary_rows
            .contains(&("Total".to_string(), "$441.02".to_string())));

        let text = view.to_string();
        assert!(text.contains("Tracking: TRK9"));
        assert!(text.contains("Ring (Gold / 7 / 1.5ct) x 2 @ $199.50"));
    }
}
