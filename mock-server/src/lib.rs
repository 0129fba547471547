//! In-memory stand-in for a WooCommerce store.
//!
//! Serves the `wc/v3` products resource and echoes every other request back
//! as JSON so tests can see exactly what a client put on the wire.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const PRODUCTS_ROUTE: &str = "/wp-json/wc/v3/products";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub regular_price: String,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub regular_price: String,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub status: Option<String>,
    pub regular_price: Option<String>,
}

#[derive(Deserialize)]
pub struct ListFilter {
    pub status: Option<String>,
}

fn default_status() -> String {
    "publish".to_string()
}

pub struct Store {
    products: RwLock<BTreeMap<u64, Product>>,
    next_id: AtomicU64,
    token: Option<String>,
}

pub type Db = Arc<Store>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

/// Store that accepts requests with or without a bearer token.
pub fn app() -> Router {
    app_with_token(None)
}

/// Store whose products routes answer 401 unless `Authorization` carries
/// `Bearer <token>`.
pub fn app_with_token(token: Option<String>) -> Router {
    let db: Db = Arc::new(Store {
        products: RwLock::new(BTreeMap::new()),
        next_id: AtomicU64::new(1),
        token,
    });
    Router::new()
        .route(
            PRODUCTS_ROUTE,
            get(list_products).post(create_product).options(describe_products),
        )
        .route(
            "/wp-json/wc/v3/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .fallback(echo)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_token(listener: TcpListener, token: Option<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

fn authorize(db: &Store, headers: &HeaderMap) -> ApiResult<()> {
    let Some(token) = &db.token else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented == Some(format!("Bearer {token}").as_str()) {
        Ok(())
    } else {
        Err(rest_error(
            StatusCode::UNAUTHORIZED,
            "woocommerce_rest_cannot_view",
            "Sorry, you cannot list resources.",
        ))
    }
}

fn rest_error(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "code": code, "message": message, "data": { "status": status.as_u16() } })),
    )
}

fn invalid_id() -> (StatusCode, Json<Value>) {
    rest_error(StatusCode::NOT_FOUND, "woocommerce_rest_product_invalid_id", "Invalid ID.")
}

async fn list_products(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Json<Vec<Product>>> {
    authorize(&db, &headers)?;
    let products = db.products.read().await;
    Ok(Json(
        products
            .values()
            .filter(|p| filter.status.as_deref().map_or(true, |s| p.status == s))
            .cloned()
            .collect(),
    ))
}

async fn create_product(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    authorize(&db, &headers)?;
    let product = Product {
        id: db.next_id.fetch_add(1, Ordering::Relaxed),
        name: input.name,
        status: input.status,
        regular_price: input.regular_price,
    };
    debug!(id = product.id, "created product");
    db.products.write().await.insert(product.id, product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn describe_products(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    authorize(&db, &headers)?;
    Ok(Json(json!({
        "namespace": "wc/v3",
        "methods": ["GET", "POST"],
    })))
}

async fn get_product(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<Json<Product>> {
    authorize(&db, &headers)?;
    let products = db.products.read().await;
    products.get(&id).cloned().map(Json).ok_or_else(invalid_id)
}

async fn update_product(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<UpdateProduct>,
) -> ApiResult<Json<Product>> {
    authorize(&db, &headers)?;
    let mut products = db.products.write().await;
    let product = products.get_mut(&id).ok_or_else(invalid_id)?;
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(status) = input.status {
        product.status = status;
    }
    if let Some(regular_price) = input.regular_price {
        product.regular_price = regular_price;
    }
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<Json<Product>> {
    authorize(&db, &headers)?;
    let mut products = db.products.write().await;
    products.remove(&id).map(Json).ok_or_else(invalid_id)
}

/// Reflect method, path, query pairs, headers and body of any unrouted request.
async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: String,
) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": query,
        "headers": headers,
        "body": if body.is_empty() { Value::Null } else { Value::String(body) },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serializes_to_json() {
        let product = Product {
            id: 7,
            name: "Beanie".to_string(),
            status: "publish".to_string(),
            regular_price: "18.00".to_string(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Beanie");
        assert_eq!(json["regular_price"], "18.00");
    }

    #[test]
    fn create_product_defaults_status_to_publish() {
        let input: CreateProduct = serde_json::from_str(r#"{"name":"Cap"}"#).unwrap();
        assert_eq!(input.status, "publish");
        assert!(input.regular_price.is_empty());
    }

    #[test]
    fn create_product_rejects_missing_name() {
        let result: Result<CreateProduct, _> = serde_json::from_str(r#"{"status":"draft"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_product_all_fields_optional() {
        let input: UpdateProduct = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.status.is_none());
        assert!(input.regular_price.is_none());
    }

    #[test]
    fn authorize_without_token_accepts_anything() {
        let store = Store {
            products: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            token: None,
        };
        assert!(authorize(&store, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn authorize_with_token_checks_bearer() {
        let store = Store {
            products: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            token: Some("abc".to_string()),
        };
        let mut headers = HeaderMap::new();
        assert!(authorize(&store, &headers).is_err());
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert!(authorize(&store, &headers).is_ok());
    }
}
