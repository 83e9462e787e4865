//! HTTP-level tests for signup, login and the auth extractor.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_then_login(pool: PgPool) {
    let app = common::build_test_app(pool);

    let token = common::signup(app.clone(), "Ada@Example.com").await;
    let me = body_json(get_auth(app.clone(), "/api/v1/auth/me", &token).await).await;
    assert_eq!(me["data"]["email"], "ada@example.com");
    assert!(me["data"].get("password_hash").is_none());

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "ada@example.com", "password": "correct-horse" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["expires_in"], 3600);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_signup_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::signup(app.clone(), "ada@example.com").await;

    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({ "email": "ada@example.com", "password": "another-pass" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_rejects_short_password_and_bad_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/signup",
        json!({ "email": "ada@example.com", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({ "email": "not-an-email", "password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::signup(app.clone(), "ada@example.com").await;

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "ada@example.com", "password": "wrong-horse" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_owner_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/products").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/products", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
