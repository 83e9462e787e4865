//! HTTP-level tests for widget authoring and the public embed surfaces.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, body_text, get, get_auth, patch_json_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn create_widget(app: axum::Router, token: &str, product_id: i64, config: serde_json::Value) -> String {
    let response = post_json_auth(
        app,
        &format!("/api/v1/products/{product_id}/widgets"),
        json!({ "config": config }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_fills_defaults_and_snippet(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/products/{product_id}/widgets"),
        json!({ "config": { "columns": 2, "theme": "dark", "maxCount": 500 } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let data = body_json(response).await["data"].clone();

    let id = data["id"].as_str().unwrap();
    assert_eq!(data["name"], "My Widget");
    assert_eq!(data["config"]["columns"], 2);
    assert_eq!(data["config"]["theme"], "dark");
    assert_eq!(data["config"]["maxCount"], 50);
    assert_eq!(data["config"]["fontFamily"], "System UI");
    assert_eq!(data["config"]["showAvatar"], true);
    assert_eq!(
        data["snippet"],
        format!(
            "<div data-kudos-widget=\"{id}\"></div>\n<script src=\"{}/widget.js\" async></script>",
            common::TEST_BASE_URL
        )
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_merges_over_stored_config(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;
    let id = create_widget(app.clone(), &token, product_id, json!({ "columns": 1 })).await;
    let uri = format!("/api/v1/widgets/{id}");

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "name": "Homepage", "config": { "showRole": false } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(get_auth(app.clone(), &uri, &token).await).await["data"].clone();
    assert_eq!(data["name"], "Homepage");
    assert_eq!(data["config"]["columns"], 1);
    assert_eq!(data["config"]["showRole"], false);

    let listed = body_json(
        get_auth(app, &format!("/api/v1/products/{product_id}/widgets"), &token).await,
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_foreign_and_malformed_widget_ids(pool: PgPool) {
    let app = common::build_test_app(pool);
    let ada = common::signup(app.clone(), "ada@example.com").await;
    let grace = common::signup(app.clone(), "grace@example.com").await;
    let product_id = common::create_product(app.clone(), &ada, "Engine").await;
    let id = create_widget(app.clone(), &ada, product_id, json!({})).await;

    let response = get_auth(app.clone(), &format!("/api/v1/widgets/{id}"), &grace).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/widgets/not-a-uuid", &ada).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_widget_data_serves_approved_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;
    for name in ["Grace", "Linus", "Margaret"] {
        common::add_testimonial(app.clone(), &token, product_id, name).await;
    }
    let hidden = common::add_testimonial(app.clone(), &token, product_id, "Hidden").await;
    patch_json_auth(
        app.clone(),
        &format!("/api/v1/testimonials/{hidden}/approve"),
        json!({ "approved": false }),
        &token,
    )
    .await;
    let id = create_widget(app.clone(), &token, product_id, json!({ "maxCount": 2 })).await;

    let response = get(app, &format!("/widget/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["product"]["name"], "Engine");
    assert_eq!(json["config"]["maxCount"], 2);
    let items = json["testimonials"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Margaret");
    assert_eq!(items[1]["name"], "Linus");
    assert!(items[0].get("approved").is_none());
    assert!(items[0].get("product_id").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_widget_data_unknown_ids(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/widget/5f0c8a4e-3a8d-4e8e-9f59-3b4f2a0c9d11").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/widget/garbage").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_widget_data_allows_any_origin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;
    let id = create_widget(app.clone(), &token, product_id, json!({})).await;

    let request = Request::builder()
        .uri(format!("/widget/{id}"))
        .header(header::ORIGIN, "https://customer-site.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_preview_renders_approved_cards(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Engine").await;
    common::add_testimonial(app.clone(), &token, product_id, "Grace").await;
    common::add_testimonial(app.clone(), &token, product_id, "Linus").await;

    let response = post_json_auth(
        app,
        "/api/v1/widgets/preview",
        json!({ "productId": product_id, "config": { "fontFamily": "Inter", "maxCount": 1 } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["card_count"], 1);
    assert!(data["html"].as_str().unwrap().contains("Linus loves it"));
    assert!(data["font_stylesheet"]
        .as_str()
        .unwrap()
        .contains("family=Inter"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_loader_script_headers(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/widget.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=3600"
    );
    let js = body_text(response).await;
    assert!(js.contains(common::TEST_BASE_URL));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_wall_lists_approved_testimonials(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::signup(app.clone(), "ada@example.com").await;
    let product_id = common::create_product(app.clone(), &token, "Analytical Engine").await;
    common::add_testimonial(app.clone(), &token, product_id, "Grace").await;

    let response = get(app.clone(), "/wall/analytical-engine").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["product"]["name"], "Analytical Engine");
    assert_eq!(json["count"], 1);
    assert_eq!(json["testimonials"][0]["name"], "Grace");

    let response = get(app, "/wall/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
