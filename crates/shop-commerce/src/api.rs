//! Typed client for the storefront REST API.
//!
//! Responses come wrapped in different envelopes depending on the endpoint
//! (`{"orders": [...]}`, `{"order": {...}}`, `{"data": ...}`, or bare values).
//! Each call accepts all of them. Orders are decoded through
//! [`OrderRecord`](crate::checkout::OrderRecord) here and nowhere else.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shop_data::FetchClient;

use crate::checkout::{Address, AddressForm, NewOrderRequest, Order, OrderRecord, OrderStats, OrderStatus};
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId};
use crate::money::Currency;
use crate::session::UserProfile;

/// A saved wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Token and profile returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    pub user: UserProfile,
}

/// Fields accepted by the profile update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Client for the storefront endpoints.
#[derive(Debug, Clone)]
pub struct StorefrontApi {
    client: FetchClient,
    currency: Currency,
}

impl StorefrontApi {
    /// Wrap a client. Order amounts are read in `currency`.
    pub fn new(client: FetchClient, currency: Currency) -> Self {
        Self { client, currency }
    }

    /// Set or clear the bearer token sent with every request.
    pub fn set_token(&mut self, token: Option<&str>) {
        self.client.set_bearer_token(token);
    }

    /// Whether requests are authenticated.
    pub fn has_token(&self) -> bool {
        self.client.has_bearer_token()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    // === Orders ===

    /// `POST /api/orders`
    ///
    /// Once the server answers 2xx the order exists, so an unreadable body
    /// never fails the call: the order is rebuilt from `request` plus
    /// whatever id and order number the body still carries.
    pub async fn create_order(&self, request: &NewOrderRequest) -> Result<Order, CommerceError> {
        let response = self
            .client
            .post("/api/orders")
            .json(request)?
            .send()
            .await?
            .error_for_status()?;
        let body = serde_json::from_slice(response.bytes()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "order created but response is not JSON");
            Value::Null
        });
        let body = unwrap_envelope(body, &["order"]);

        match serde_json::from_value::<OrderRecord>(body.clone()) {
            Ok(record) => Ok(record.into_order(self.currency)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "order created but response unreadable, using submitted details"
                );
                Ok(request.placed_order(&body, self.currency))
            }
        }
    }

    /// `GET /api/orders`
    pub async fn list_orders(&self) -> Result<Vec<Order>, CommerceError> {
        let body = self.send_json(self.client.get("/api/orders")).await?;
        let records: Vec<OrderRecord> = decode_each("order", unwrap_envelope(body, &["orders"]))?;
        Ok(records
            .into_iter()
            .map(|record| record.into_order(self.currency))
            .collect())
    }

    /// `GET /api/orders/:id`
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, CommerceError> {
        let response = self
            .client
            .get(format!("/api/orders/{}", id))
            .send()
            .await?;
        if response.status == 404 {
            return Err(CommerceError::OrderNotFound(id.to_string()));
        }
        let body: Value = response.error_for_status()?.json()?;
        self.decode_order(unwrap_envelope(body, &["order"]))
    }

    /// `PATCH /api/orders/:id/status`
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let request = self
            .client
            .patch(format!("/api/orders/{}/status", id))
            .json(&json!({ "status": status.as_str() }))?;
        let body = self.send_json(request).await?;
        self.decode_order(unwrap_envelope(body, &["order"]))
    }

    /// `GET /api/orders/stats`
    pub async fn order_stats(&self) -> Result<OrderStats, CommerceError> {
        let body = self.send_json(self.client.get("/api/orders/stats")).await?;
        decode(unwrap_envelope(body, &["stats"]))
    }

    // === Addresses ===

    /// `GET /api/addresses`
    pub async fn list_addresses(&self) -> Result<Vec<Address>, CommerceError> {
        let body = self.send_json(self.client.get("/api/addresses")).await?;
        decode_each("address", unwrap_envelope(body, &["addresses"]))
    }

    /// `POST /api/addresses`
    pub async fn create_address(&self, form: &AddressForm) -> Result<Address, CommerceError> {
        let body = self
            .send_json(self.client.post("/api/addresses").json(form)?)
            .await?;
        decode(unwrap_envelope(body, &["address"]))
    }

    // === Wishlist ===

    /// `GET /api/wishlist`
    pub async fn wishlist(&self) -> Result<Vec<WishlistItem>, CommerceError> {
        let body = self.send_json(self.client.get("/api/wishlist")).await?;
        decode(unwrap_envelope(body, &["wishlist", "items"]))
    }

    /// `POST /api/wishlist`
    pub async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<(), CommerceError> {
        let request = self
            .client
            .post("/api/wishlist")
            .json(&json!({ "productId": product_id }))?;
        self.send_json(request).await?;
        Ok(())
    }

    /// `DELETE /api/wishlist/:productId`
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<(), CommerceError> {
        self.send_json(self.client.delete(format!("/api/wishlist/{}", product_id)))
            .await?;
        Ok(())
    }

    // === Auth ===

    /// `POST /api/auth/send-otp`
    pub async fn send_otp(&self, phone: &str) -> Result<(), CommerceError> {
        let request = self
            .client
            .post("/api/auth/send-otp")
            .json(&json!({ "phone": phone }))?;
        self.send_json(request).await?;
        Ok(())
    }

    /// `POST /api/auth/verify-otp`
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<AuthGrant, CommerceError> {
        let request = self
            .client
            .post("/api/auth/verify-otp")
            .json(&json!({ "phone": phone, "otp": otp }))?;
        decode(unwrap_envelope(self.send_json(request).await?, &["data"]))
    }

    /// `PUT /api/auth/profile`
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, CommerceError> {
        let body = self
            .send_json(self.client.put("/api/auth/profile").json(update)?)
            .await?;
        decode(unwrap_envelope(body, &["user"]))
    }

    /// `POST /api/auth/google`
    pub async fn google_login(&self, credential: &str) -> Result<AuthGrant, CommerceError> {
        let request = self
            .client
            .post("/api/auth/google")
            .json(&json!({ "credential": credential }))?;
        decode(unwrap_envelope(self.send_json(request).await?, &["data"]))
    }

    async fn send_json(
        &self,
        request: shop_data::ClientRequestBuilder,
    ) -> Result<Value, CommerceError> {
        let response = request.send().await?.error_for_status()?;
        if response.bytes().is_empty() {
            return Ok(Value::Null);
        }
        Ok(response.json()?)
    }

    fn decode_order(&self, value: Value) -> Result<Order, CommerceError> {
        let record: OrderRecord = decode(value)?;
        Ok(record.into_order(self.currency))
    }
}

/// Strip a response envelope. The first of `keys` present wins, then
/// `data`; anything else is returned unchanged.
fn unwrap_envelope(value: Value, keys: &[&str]) -> Value {
    match value {
        Value::Object(mut map) => {
            for key in keys.iter().copied().chain(["data"]) {
                if let Some(inner) = map.remove(key) {
                    return if key == "data" {
                        unwrap_envelope(inner, keys)
                    } else {
                        inner
                    };
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CommerceError> {
    serde_json::from_value(value).map_err(CommerceError::from)
}

/// Decode a list one element at a time. Elements that still fail are logged
/// and skipped; only a value that is not a list is an error.
fn decode_each<T: DeserializeOwned>(
    kind: &'static str,
    value: Value,
) -> Result<Vec<T>, CommerceError> {
    let items: Vec<Value> = decode(value)?;
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(kind, index, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_data::{Method, RecordingTransport};
    use std::sync::Arc;

    fn api(transport: &Arc<RecordingTransport>) -> StorefrontApi {
        let client = FetchClient::new(Arc::clone(transport))
            .with_base_url("http://shop.test")
            .with_bearer_token("tok");
        StorefrontApi::new(client, Currency::USD)
    }

    #[test]
    fn test_unwrap_envelope() {
        let orders = json!({"success": true, "orders": [1, 2]});
        assert_eq!(unwrap_envelope(orders, &["orders"]), json!([1, 2]));

        let nested = json!({"data": {"orders": []}});
        assert_eq!(unwrap_envelope(nested, &["orders"]), json!([]));

        let bare = json!([{"id": 1}]);
        assert_eq!(unwrap_envelope(bare.clone(), &["orders"]), bare);

        let plain = json!({"id": 1});
        assert_eq!(unwrap_envelope(plain.clone(), &["order"]), plain);
    }

    #[tokio::test]
    async fn test_list_orders_accepts_both_shapes() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"orders": [{"id": 1, "status": "pending"}]}));
        transport.push_json(200, json!([{"id": 2, "status": "delivered"}]));
        let api = api(&transport);

        let enveloped = api.list_orders().await.unwrap();
        let bare = api.list_orders().await.unwrap();

        assert_eq!(enveloped[0].id.as_str(), "1");
        assert_eq!(bare[0].status, OrderStatus::Delivered);

        let request = &transport.requests()[0];
        assert_eq!(request.url(), "http://shop.test/api/orders");
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_list_orders_tolerates_bad_records() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(
            200,
            json!({"orders": [
                {"id": 1, "items": [{"name": "Ring", "quantity": 1, "price": 10}]},
                {"id": 2, "items": [{"name": null, "quantity": 2, "price": 5}]},
                {"items": "not a list"}
            ]}),
        );

        let orders = api(&transport).list_orders().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].id.as_str(), "2");
        assert_eq!(orders[1].lines[0].name, crate::checkout::NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_list_addresses_tolerates_bad_records() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(
            200,
            json!({"addresses": [
                {"id": 1, "name": "Asha", "street": "12 MG Road", "city": "Bengaluru",
                 "state": "KA", "zip": "560001", "country": null, "phone": null},
                {"name": "no id"}
            ]}),
        );

        let addresses = api(&transport).list_addresses().await.unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].country, "");
        assert_eq!(addresses[0].city, "Bengaluru");
    }

    #[tokio::test]
    async fn test_list_orders_rejects_non_list() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"orders": "nope"}));

        let err = api(&transport).list_orders().await.unwrap_err();
        assert!(matches!(err, CommerceError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(404, json!({"message": "Order not found"}));

        let err = api(&transport).get_order(&OrderId::new("9")).await.unwrap_err();
        assert!(matches!(err, CommerceError::OrderNotFound(ref id) if id == "9"));
    }

    #[tokio::test]
    async fn test_update_order_status_body() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"order": {"id": 5, "status": "cancelled"}}));

        let order = api(&transport)
            .update_order_status(&OrderId::new("5"), OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        let request = &transport.requests()[0];
        assert_eq!(request.method(), Method::Patch);
        assert_eq!(request.url(), "http://shop.test/api/orders/5/status");
        let body: Value = request.json_body().unwrap();
        assert_eq!(body, json!({"status": "cancelled"}));
    }

    #[tokio::test]
    async fn test_server_message_surfaces() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(400, json!({"message": "Address not found"}));

        let err = api(&transport).list_addresses().await.unwrap_err();
        assert_eq!(err.user_message(), "Address not found");
    }

    #[tokio::test]
    async fn test_wishlist_roundtrip_requests() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"wishlist": [{"productId": 3, "name": "Ring"}]}));
        transport.push_json(201, json!({"success": true}));
        transport.push_json(200, json!({"success": true}));
        let api = api(&transport);

        let items = api.wishlist().await.unwrap();
        assert_eq!(items[0].product_id.as_str(), "3");

        api.add_to_wishlist(&ProductId::new("4")).await.unwrap();
        api.remove_from_wishlist(&ProductId::new("4")).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[1].json_body::<Value>().unwrap(), json!({"productId": "4"}));
        assert_eq!(requests[2].method(), Method::Delete);
        assert_eq!(requests[2].url(), "http://shop.test/api/wishlist/4");
    }

    #[tokio::test]
    async fn test_verify_otp_returns_grant() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(
            200,
            json!({"success": true, "token": "jwt", "user": {"id": 1, "phone": "9876543210"}}),
        );

        let grant = api(&transport).verify_otp("9876543210", "123456").await.unwrap();
        assert_eq!(grant.token, "jwt");
        assert_eq!(grant.user.phone.as_deref(), Some("9876543210"));
    }
}
