//! HTTP-level integration tests for the `/products` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_product, delete, get, post_json, put_json, stock_of};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_product_records_opening_stock(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/products",
        json!({"name": "Cimento", "price": 30.0, "unit": "saco", "category": "cimento", "opening_stock": 10}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Cimento");
    assert_eq!(json["data"]["stock"], 10.0);

    let id = json["data"]["id"].as_i64().unwrap();
    let history = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/stock/{id}/history"),
        )
        .await,
    )
    .await;
    assert_eq!(history["data"][0]["type"], "AJUSTE");
    assert_eq!(history["data"][0]["quantity"], 10.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_product_without_opening_stock(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/products",
        json!({"name": "Areia", "price": 0, "unit": "m3", "category": "agregado"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    assert_eq!(stock_of(&pool, id).await, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_product_validation(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/products",
        json!({"name": " ", "price": 1.0, "unit": "un", "category": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/products",
        json!({"name": "Telha", "price": -1.0, "unit": "un", "category": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_product_keeps_stock(pool: SqlitePool) {
    let id = create_product(&pool, "Cimento", 30.0, 10.0).await;

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/products/{id}"),
        json!({"price": 32.5}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["price"], 32.5);
    assert_eq!(json["data"]["name"], "Cimento");
    assert_eq!(stock_of(&pool, id).await, 10.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_get_and_delete_product(pool: SqlitePool) {
    let telha = create_product(&pool, "Telha", 3.0, 0.0).await;
    create_product(&pool, "Areia", 1.0, 0.0).await;

    let list = body_json(get(common::build_test_app(pool.clone()), "/api/v1/products").await).await;
    let names: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Areia", "Telha"]);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/products/{telha}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/products/{telha}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/products/{telha}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stock_of_missing_product_returns_404(pool: SqlitePool) {
    let response = get(common::build_test_app(pool), "/api/v1/products/77/stock").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
