//! HTTP-level tests for products and ownership enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_slug_collisions_get_numeric_suffix(pool: PgPool) {
    let app = common::build_test_app(pool);
    let ada = common::signup(app.clone(), "ada@example.com").await;
    let grace = common::signup(app.clone(), "grace@example.com").await;

    let mut slugs = Vec::new();
    for token in [&ada, &grace, &ada] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/products",
            json!({ "name": "My Great App!", "description": "  " }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert!(json["data"]["description"].is_null());
        slugs.push(json["data"]["slug"].as_str().unwrap().to_string());
    }

    assert_eq!(slugs, ["my-great-app", "my-great-app-2", "my-great-app-3"]);

    let listed = body_json(get_auth(app, "/api/v1/products", &ada).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_name_without_slug_characters_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;

    let response =
        post_json_auth(app, "/api/v1/products", json!({ "name": "!!!" }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_foreign_and_missing_products(pool: PgPool) {
    let app = common::build_test_app(pool);
    let ada = common::signup(app.clone(), "ada@example.com").await;
    let grace = common::signup(app.clone(), "grace@example.com").await;
    let product_id = common::create_product(app.clone(), &ada, "Engine").await;

    let response = get_auth(app.clone(), &format!("/api/v1/products/{product_id}"), &grace).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/products/999999", &ada).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
