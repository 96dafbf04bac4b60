//! Black-box tests against the real router over HTTP.

use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;

use pawmart_accounts::Address;
use pawmart_catalog::Product;
use pawmart_core::{AddressId, Money, OrderId, ProductId, UserId};
use pawmart_infra::{CheckoutService, InMemoryStore, LedgerError, OrderLedger, StoreError};
use pawmart_orders::Order;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Build the production router over a seeded in-memory store and bind
    /// it to an ephemeral port.
    async fn spawn(store: Arc<InMemoryStore>) -> Self {
        let checkout = CheckoutService::new(store.clone(), store.clone(), store);
        Self::spawn_with(checkout).await
    }

    async fn spawn_with(checkout: CheckoutService) -> Self {
        let app = pawmart_api::app::build_app(checkout);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn seeded_store(owner: UserId, address_id: AddressId, product_id: ProductId, stock: u32) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert_product(Product {
        id: product_id,
        name: "Dog Leash".to_string(),
        description: Some("Reflective, 2m".to_string()),
        price: Money::from_minor(4500),
        stock_quantity: stock,
        is_active: true,
        created_at: Utc::now(),
    });
    store.insert_address(Address {
        id: address_id,
        owner_id: owner,
        title: "Home".to_string(),
        full_name: "Ada Yilmaz".to_string(),
        phone: "+905551112233".to_string(),
        address: "Bahar Sk. 12/3".to_string(),
        city: "Istanbul".to_string(),
        district: "Kadikoy".to_string(),
        postal_code: "34710".to_string(),
        is_default: true,
    });
    store
}

fn order_body(product_id: ProductId, quantity: u32, address_id: AddressId) -> serde_json::Value {
    json!({
        "items": [{"product_id": product_id.to_string(), "quantity": quantity}],
        "shipping_address_id": address_id.to_string(),
        "payment_method": "card",
    })
}

#[tokio::test]
async fn placing_an_order_returns_201_with_computed_totals() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    let store = seeded_store(owner, address_id, product_id, 5);
    let server = TestServer::spawn(store.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .json(&order_body(product_id, 2, address_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let order: serde_json::Value = response.json().await.unwrap();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total"], 9000);
    assert_eq!(order["payment_method"], "card");
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["lines"][0]["unit_price"], 4500);
    assert_eq!(order["lines"][0]["line_total"], 9000);
    assert_eq!(store.stock_of(product_id), Some(3));

    // The order is durable and listed for its owner.
    let listed: serde_json::Value = client
        .get(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn exceeding_stock_is_a_409_and_decrements_nothing() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    let store = seeded_store(owner, address_id, product_id, 1);
    let server = TestServer::spawn(store.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .json(&order_body(product_id, 2, address_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(store.stock_of(product_id), Some(1));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn unknown_payment_method_is_a_400() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    let store = seeded_store(owner, address_id, product_id, 5);
    let server = TestServer::spawn(store.clone()).await;

    let mut body = order_body(product_id, 1, address_id);
    body["payment_method"] = json!("cash_on_delivery");

    let response = reqwest::Client::new()
        .post(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_payment_method");
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn missing_principal_is_a_401() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    let store = seeded_store(owner, address_id, product_id, 5);
    let server = TestServer::spawn(store).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/orders", server.base_url))
        .json(&order_body(product_id, 1, address_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_address_is_a_400_invalid_address() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    // Address book entry belongs to someone else entirely.
    let store = seeded_store(UserId::new(), address_id, product_id, 5);
    let server = TestServer::spawn(store.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .json(&order_body(product_id, 1, address_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_address");
    assert_eq!(store.stock_of(product_id), Some(5));
}

/// Ledger that refuses every commit, standing in for a database outage.
struct UnreachableLedger;

#[async_trait::async_trait]
impl OrderLedger for UnreachableLedger {
    async fn commit(&self, _order: &Order) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("connection reset".to_string()))
    }

    async fn orders_for_owner(&self, _owner: UserId) -> Result<Vec<Order>, StoreError> {
        Ok(Vec::new())
    }

    async fn find_order(&self, _owner: UserId, _id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(None)
    }
}

#[tokio::test]
async fn ledger_outage_during_commit_is_a_500() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    let store = seeded_store(owner, address_id, product_id, 5);
    let checkout =
        CheckoutService::new(store.clone(), store.clone(), Arc::new(UnreachableLedger));
    let server = TestServer::spawn_with(checkout).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .json(&order_body(product_id, 1, address_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "commit_failed");
    assert_eq!(store.stock_of(product_id), Some(5));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn orders_are_not_visible_to_other_accounts() {
    let (owner, address_id, product_id) = (UserId::new(), AddressId::new(), ProductId::new());
    let store = seeded_store(owner, address_id, product_id, 5);
    let server = TestServer::spawn(store).await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{}/api/orders", server.base_url))
        .header("x-user-id", owner.to_string())
        .json(&order_body(product_id, 1, address_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = created["id"].as_str().unwrap();

    let response = client
        .get(format!("{}/api/orders/{}", server.base_url, order_id))
        .header("x-user-id", UserId::new().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .get(format!("{}/api/orders/{}", server.base_url, order_id))
        .header("x-user-id", owner.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
