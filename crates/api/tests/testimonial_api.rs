//! HTTP-level tests for public submission and owner moderation.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, patch_json_auth, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_submission_is_form_and_unapproved(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;

    let response = post_json(
        app.clone(),
        "/api/v1/testimonials",
        json!({
            "productId": product_id,
            "name": "Grace",
            "text": "Compiles my thoughts",
            "approved": true,
            "source": "twitter"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let listed = body_json(
        get_auth(
            app,
            &format!("/api/v1/products/{product_id}/testimonials"),
            &token,
        )
        .await,
    )
    .await;
    let items = listed["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id);
    assert_eq!(items[0]["source"], "form");
    assert_eq!(items[0]["approved"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_submission_validation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;

    let response = post_json(
        app.clone(),
        "/api/v1/testimonials",
        json!({ "product_id": product_id, "name": "Grace", "text": "a".repeat(501) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app.clone(),
        "/api/v1/testimonials",
        json!({ "product_id": product_id, "name": "  ", "text": "Hi" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/api/v1/testimonials",
        json!({ "product_id": 999999, "name": "Grace", "text": "Hi" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_owner_entry_is_preapproved_and_filterable(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;

    common::add_testimonial(app.clone(), &token, product_id, "Grace").await;
    post_json(
        app.clone(),
        "/api/v1/testimonials",
        json!({ "product_id": product_id, "name": "Linus", "text": "Fine" }),
    )
    .await;

    let base = format!("/api/v1/products/{product_id}/testimonials");
    let approved = body_json(get_auth(app.clone(), &format!("{base}?approved=true"), &token).await).await;
    let pending = body_json(get_auth(app.clone(), &format!("{base}?approved=false"), &token).await).await;
    let all = body_json(get_auth(app, &base, &token).await).await;

    assert_eq!(approved["data"].as_array().unwrap().len(), 1);
    assert_eq!(approved["data"][0]["name"], "Grace");
    assert_eq!(approved["data"][0]["source"], "manual");
    assert_eq!(pending["data"].as_array().unwrap().len(), 1);
    assert_eq!(pending["data"][0]["name"], "Linus");
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_approval_toggle_and_ownership(pool: PgPool) {
    let app = common::build_test_app(pool);
    let ada = common::signup(app.clone(), "ada@example.com").await;
    let grace = common::signup(app.clone(), "grace@example.com").await;
    let product_id = common::create_product(app.clone(), &ada, "Engine").await;
    let id = common::add_testimonial(app.clone(), &ada, product_id, "Linus").await;
    let uri = format!("/api/v1/testimonials/{id}/approve");

    let response = patch_json_auth(app.clone(), &uri, json!({ "approved": false }), &ada).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["approved"], false);

    let response = patch_json_auth(app.clone(), &uri, json!({ "approved": true }), &grace).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app, &uri, json!({ "approved": true }), &ada).await;
    assert_eq!(body_json(response).await["data"]["approved"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_then_missing(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;
    let id = common::add_testimonial(app.clone(), &token, product_id, "Grace").await;
    let uri = format!("/api/v1/testimonials/{id}");

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
