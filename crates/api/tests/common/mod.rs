#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use balcao_api::config::ServerConfig;
use balcao_api::router::build_app_router;
use balcao_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack that production uses.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with_shutdown(pool, CancellationToken::new())
}

/// Same as [`build_test_app`] with a caller-controlled shutdown token.
pub fn build_test_app_with_shutdown(pool: SqlitePool, shutdown: CancellationToken) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), shutdown);
    build_app_router(state, &config)
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(Request::delete(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, "POST", uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, "PUT", uri, body).await
}

async fn send_json(app: Router, method: &str, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Create a product through the API and return its id.
pub async fn create_product(pool: &SqlitePool, name: &str, price: f64, stock: f64) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/products",
        serde_json::json!({
            "name": name,
            "price": price,
            "unit": "saco",
            "category": "material",
            "opening_stock": stock,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Read a product's current stock level through the API.
pub async fn stock_of(pool: &SqlitePool, product_id: i64) -> f64 {
    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/products/{product_id}/stock"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["stock"].as_f64().unwrap()
}
