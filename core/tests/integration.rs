//! End-to-end tests against the mock store over real HTTP.
//!
//! # Design
//! Each test starts the mock server on a random port and points a client at
//! `http://127.0.0.1` with that port as the port override, so URL
//! composition, port splicing, header assembly and the default ureq
//! transport are all exercised together.

use std::net::SocketAddr;

use mock_server::Product;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use woocommerce_core::platform::USER_AGENT;
use woocommerce_core::{Client, ClientConfig, Params, TransportOverrides, UreqTransport};

const TOKEN: &str = "test-token";

async fn spawn_store(token: Option<&str>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let token = token.map(str::to_string);
    tokio::spawn(async move { mock_server::run_with_token(listener, token).await.unwrap() });
    addr
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new("http://127.0.0.1/").with_port(addr.port())
}

fn params(value: Value) -> Params {
    value.as_object().cloned().unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn product_lifecycle() {
    let addr = spawn_store(Some(TOKEN)).await;
    let client = Client::new(config(addr).with_token(TOKEN)).unwrap();

    // Step 1: list, should be empty.
    let products: Vec<Product> = client.get("products", None).await.unwrap().json().unwrap();
    assert!(products.is_empty(), "expected empty list");

    // Step 2: create a product.
    let response = client
        .post("products", &json!({ "name": "Beanie", "regular_price": "18.00" }), None)
        .await
        .unwrap();
    assert_eq!(response.status, 201);
    let created: Product = response.json().unwrap();
    assert_eq!(created.name, "Beanie");
    let id = created.id;

    // Step 3: fetch it back.
    let fetched: Product = client
        .get(&format!("products/{id}"), None)
        .await
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(fetched, created);

    // Step 4: update the price.
    let updated: Product = client
        .put(&format!("products/{id}"), &json!({ "regular_price": "9.99" }), None)
        .await
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(updated.regular_price, "9.99");
    assert_eq!(updated.name, "Beanie");

    // Step 5: filter by status.
    let drafts: Vec<Product> = client
        .get("products", Some(&params(json!({ "status": "draft" }))))
        .await
        .unwrap()
        .json()
        .unwrap();
    assert!(drafts.is_empty());

    // Step 6: options on the collection.
    let description: Value = client.options("products", None).await.unwrap().json().unwrap();
    assert_eq!(description["namespace"], "wc/v3");

    // Step 7: delete, then the product is gone.
    let force = params(json!({ "force": true }));
    client.delete(&format!("products/{id}"), Some(&force)).await.unwrap();
    let err = client.get(&format!("products/{id}"), None).await.unwrap_err();
    assert!(matches!(
        err.transport_error::<ureq::Error>(),
        Some(ureq::Error::StatusCode(404))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn request_reaches_server_as_assembled() {
    let addr = spawn_store(None).await;
    let client = Client::new(config(addr).with_token(TOKEN)).unwrap();

    let query = params(json!({ "status": "processing", "meta": { "key": "gift", "value": "yes" } }));
    let echo: Value = client
        .post("orders/5/notes", &json!({ "note": "wrapped" }), Some(&query))
        .await
        .unwrap()
        .json()
        .unwrap();

    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/wp-json/wc/v3/orders/5/notes");
    assert_eq!(
        echo["query"],
        json!([["status", "processing"], ["meta[key]", "gift"], ["meta[value]", "yes"]])
    );
    assert_eq!(echo["headers"]["authorization"], format!("Bearer {TOKEN}"));
    assert_eq!(echo["headers"]["accept"], "application/json");
    assert_eq!(echo["headers"]["content-type"], "application/json;charset=utf-8");
    assert_eq!(echo["headers"]["user-agent"], USER_AGENT);
    assert_eq!(echo["body"], r#"{"note":"wrapped"}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn get_without_token_sends_no_authorization() {
    let addr = spawn_store(None).await;
    let client = Client::new(config(addr)).unwrap();

    let echo: Value = client.get("reports", None).await.unwrap().json().unwrap();
    assert_eq!(echo["method"], "GET");
    assert!(echo["headers"].get("authorization").is_none());
    assert!(echo["headers"].get("content-type").is_none());
    assert_eq!(echo["body"], Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_token_surfaces_transport_error() {
    let addr = spawn_store(Some(TOKEN)).await;
    let client = Client::new(config(addr).with_token("wrong")).unwrap();

    let err = client.get("products", None).await.unwrap_err();
    assert!(matches!(
        err.transport_error::<ureq::Error>(),
        Some(ureq::Error::StatusCode(401))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_errors_can_be_returned_as_data() {
    let addr = spawn_store(Some(TOKEN)).await;
    let transport = UreqTransport::new().status_as_error(false);
    let client = Client::with_transport(config(addr), transport).unwrap();

    let response = client.get("products", None).await.unwrap();
    assert_eq!(response.status, 401);
    assert!(!response.is_success());
    let body: Value = response.json().unwrap();
    assert_eq!(body["code"], "woocommerce_rest_cannot_view");
}

#[tokio::test(flavor = "multi_thread")]
async fn override_method_is_what_the_server_sees() {
    let addr = spawn_store(None).await;
    let overrides = TransportOverrides::new().set("method", "PATCH");
    let client = Client::new(config(addr).with_transport_overrides(overrides)).unwrap();

    let echo: Value = client.get("orders/9", None).await.unwrap().json().unwrap();
    assert_eq!(echo["method"], "PATCH");
    assert_eq!(echo["path"], "/wp-json/wc/v3/orders/9");
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_store_surfaces_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = Client::new(ClientConfig::new("http://127.0.0.1").with_port(port)).unwrap();
    let err = client.get("products", None).await.unwrap_err();
    assert!(err.transport_error::<ureq::Error>().is_some());
}
