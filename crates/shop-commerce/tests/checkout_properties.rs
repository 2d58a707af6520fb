//! End-to-end checks of cart pricing, persistence, order decoding and order
//! submission, wired with the in-memory store and the scripted transport.

use std::sync::Arc;

use serde_json::{json, Value};
use shop_cache::{FileStore, KvStore, MemoryStore};
use shop_commerce::checkout::{decode_shipping_address, NewOrderRequest, ShippingAddress};
use shop_commerce::prelude::*;
use shop_data::{FetchClient, RecordingTransport};

fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::USD)
}

fn line(id: &str, cents: i64, quantity: i64) -> CartLine {
    CartLine::new(id, format!("Product {}", id), usd(cents), quantity)
}

fn address(id: &str, is_default: bool) -> Value {
    json!({
        "id": id.parse::<u64>().unwrap(),
        "name": "Jane Smith",
        "street": "456 Oak Ave",
        "city": "Los Angeles",
        "state": "CA",
        "zip": "90001",
        "country": "United States",
        "phone": "555-0100",
        "type": "home",
        "isDefault": is_default
    })
}

fn api(transport: &Arc<RecordingTransport>) -> StorefrontApi {
    let client = FetchClient::new(Arc::clone(transport))
        .with_base_url("http://localhost:5000")
        .with_bearer_token("token");
    StorefrontApi::new(client, Currency::USD)
}

#[test]
fn summary_components_add_up() {
    let carts: Vec<Vec<CartLine>> = vec![
        vec![line("a", 1, 1)],
        vec![line("a", 1999, 3), line("b", 5, 7)],
        vec![line("a", 0, 4), line("b", 33_333, 2)],
        vec![line("a", 12_345, 9), line("b", 99, 1), line("c", 10_001, 2)],
    ];

    for lines in &carts {
        for percent in [0, 10, 15, 20, 25] {
            let summary = compute_summary(lines, percent);
            let expected_subtotal: i64 = lines
                .iter()
                .map(|l| l.unit_price.amount_cents * l.quantity)
                .sum();

            assert_eq!(summary.subtotal.amount_cents, expected_subtotal);
            assert_eq!(
                summary.total.amount_cents,
                summary.subtotal.amount_cents + summary.shipping.amount_cents
                    + summary.tax.amount_cents
                    - summary.discount.amount_cents
            );
        }
    }
}

#[test]
fn shipping_boundary_at_500() {
    let at = compute_summary(&[line("a", 50_000, 1)], 0);
    let above = compute_summary(&[line("a", 50_001, 1)], 0);
    let below = compute_summary(&[line("a", 49_999, 1)], 0);

    assert_eq!(at.shipping, usd(5_000));
    assert_eq!(below.shipping, usd(5_000));
    assert_eq!(above.shipping, usd(0));
}

#[test]
fn save10_on_1000() {
    let book = CouponBook::default();
    let lines = [line("a", 50_000, 2)];

    let coupon = book.redeem("SAVE10").unwrap();
    let summary = compute_summary(&lines, coupon.percent);
    assert_eq!(summary.discount, usd(10_000));
    assert_eq!(summary.total, usd(98_000));

    assert!(book.redeem("HALFOFF").is_err());
    let summary = compute_summary(&lines, book.discount_percent("HALFOFF"));
    assert_eq!(summary.discount, usd(0));
}

#[test]
fn same_product_merges_even_with_different_variant() {
    let mut cart = CartStore::open(MemoryStore::new(), "shop").unwrap();
    let gold = Variant {
        color: Some("Gold".to_string()),
        ..Variant::default()
    };
    let silver = Variant {
        color: Some("Silver".to_string()),
        ..Variant::default()
    };

    cart.add(line("ring", 10_000, 2).with_variant(gold.clone())).unwrap();
    cart.add(line("ring", 10_000, 3).with_variant(silver)).unwrap();

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].quantity, 5);
    assert_eq!(cart.lines()[0].variant, gold);
}

#[test]
fn removing_last_line_clears_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut cart = CartStore::open(FileStore::open(&path).unwrap(), "shop").unwrap();
    cart.add(line("a", 1_000, 1)).unwrap();
    assert!(FileStore::open(&path).unwrap().exists("shop:cart").unwrap());

    let prompt = cart.prompt_removal(&ProductId::new("a")).unwrap();
    assert!(cart.resolve_removal(prompt, RemovalDecision::Confirm).unwrap());

    assert_eq!(cart.state(), CartState::Empty);
    assert!(!FileStore::open(&path).unwrap().exists("shop:cart").unwrap());

    let reopened = CartStore::open(FileStore::open(&path).unwrap(), "shop").unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn double_encoded_address_matches_single() {
    let object = json!({
        "name": "A", "street": "B", "city": "C", "state": "D",
        "zip": "E", "country": "F", "phone": "G"
    });
    let single = Value::String(object.to_string());
    let double = Value::String(single.to_string());

    let from_object = decode_shipping_address(&object);
    assert_eq!(from_object.name, "A");
    assert_eq!(from_object.street, "B");
    assert_eq!(decode_shipping_address(&single), from_object);
    assert_eq!(decode_shipping_address(&double), from_object);

    let broken = Value::String("{\"name\": \"A\"".to_string());
    assert_eq!(decode_shipping_address(&broken), ShippingAddress::unavailable());
}

#[tokio::test]
async fn blocked_checkout_makes_no_request() {
    let transport = Arc::new(RecordingTransport::new());
    let api = api(&transport);
    let mut flow = CheckoutFlow::default();

    let mut empty = CartStore::open(MemoryStore::new(), "shop").unwrap();
    let book: AddressBook = serde_json::from_value::<Vec<Address>>(json!([address("1", true)]))
        .map(AddressBook::from_addresses)
        .unwrap();
    let err = flow.submit(&api, true, &mut empty, &book).await.unwrap_err();
    assert!(matches!(err, CommerceError::Precondition(CheckoutBlocker::EmptyCart)));

    let mut cart = CartStore::open(MemoryStore::new(), "shop").unwrap();
    cart.add(line("a", 1_000, 1)).unwrap();
    let err = flow
        .submit(&api, true, &mut cart, &AddressBook::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Precondition(CheckoutBlocker::NoAddressSelected)
    ));

    assert_eq!(transport.request_count(), 0);
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test]
async fn order_outcome_and_local_state() {
    let transport = Arc::new(RecordingTransport::new());
    transport.push_json(200, json!({"addresses": [address("1", false), address("2", true)]}));
    transport.push_json(500, json!({"message": "Payment service unavailable"}));
    transport.push_json(
        201,
        json!({"success": true, "order": {
            "id": 77,
            "orderNumber": "ORD-77",
            "status": "pending",
            "subtotal": "60.00", "shipping": 50, "tax": 4.8, "discount": 0, "total": "114.80",
            "shippingAddress": address("2", true).to_string()
        }}),
    );
    let api = api(&transport);

    let backing = Arc::new(MemoryStore::new());
    let mut cart = CartStore::open(Arc::clone(&backing), "shop").unwrap();
    cart.add(line("a", 2_000, 3)).unwrap();

    let mut book = AddressBook::new();
    book.refresh(&api).await.unwrap();
    let addresses_before = book.addresses().to_vec();
    assert_eq!(book.selected_id(), Some(&AddressId::new("2")));

    let mut flow = CheckoutFlow::default();

    let err = flow.submit(&api, true, &mut cart, &book).await.unwrap_err();
    assert_eq!(err.user_message(), "Payment service unavailable");
    assert_eq!(flow.error(), Some("Payment service unavailable"));
    assert_eq!(cart.item_count(), 3);
    assert!(backing.exists("shop:cart").unwrap());
    assert_eq!(book.addresses(), addresses_before.as_slice());

    let order = flow.submit(&api, true, &mut cart, &book).await.unwrap();
    assert_eq!(order.order_number, "ORD-77");
    assert_eq!(order.summary.total, usd(11_480));
    assert_eq!(order.shipping_address.name, "Jane Smith");

    assert!(cart.is_empty());
    assert!(!backing.exists("shop:cart").unwrap());
    assert_eq!(book.addresses(), addresses_before.as_slice());
    assert_eq!(flow.state(), &SubmissionState::Succeeded);

    let sent: NewOrderRequest = transport.requests()[2].json_body().unwrap();
    assert_eq!(sent.items.len(), 1);
    assert_eq!(sent.items[0].quantity, 3);
    assert_eq!(sent.total, 114.8);
    assert_eq!(sent.shipping_address.id.as_str(), "2");
    assert_eq!(
        transport.requests()[2].url(),
        "http://localhost:5000/api/orders"
    );
}
