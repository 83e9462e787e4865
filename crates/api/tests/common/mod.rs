#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use kudos_api::auth::jwt::JwtConfig;
use kudos_api::config::ServerConfig;
use kudos_api::router::build_app_router;
use kudos_api::state::AppState;
use kudos_core::importer::{FetchError, PageFetcher};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use url::Url;

pub const TEST_BASE_URL: &str = "https://kudos.test";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: TEST_BASE_URL.to_string(),
        embed_assets_dir: "../embed/pkg".to_string(),
        import_fetch_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Page fetcher serving canned responses; with nothing configured every
/// request fails as if the network were down.
#[derive(Default)]
pub struct StubFetcher {
    pub json: Option<Value>,
    pub html: Option<String>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_json(&self, _url: &Url) -> Result<Value, FetchError> {
        self.json
            .clone()
            .ok_or_else(|| FetchError::Transport("network unreachable".to_string()))
    }

    async fn fetch_html(&self, _url: &Url, _user_agent: &str) -> Result<String, FetchError> {
        self.html.clone().ok_or(FetchError::Status(502))
    }
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_fetcher(pool, StubFetcher::default())
}

pub fn build_test_app_with_fetcher(pool: PgPool, fetcher: StubFetcher) -> Router {
    build_test_app_with(pool, test_config(), fetcher)
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig, fetcher: StubFetcher) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        page_fetcher: Arc::new(fetcher),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request(Method::PATCH, uri, Some(token), body)).await
}

/// POST a multipart form. Each part is `(name, filename, content)`.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[(&str, Option<&str>, &str)],
    token: &str,
) -> Response {
    let boundary = "kudos-test-boundary";
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match filename {
            Some(filename) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Sign up through the API and return the access token.
pub async fn signup(app: Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({ "email": email, "password": "correct-horse" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create a product through the API and return its id.
pub async fn create_product(app: Router, token: &str, name: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/products", json!({ "name": name }), token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Add an owner testimonial (pre-approved) and return its id.
pub async fn add_testimonial(app: Router, token: &str, product_id: i64, name: &str) -> i64 {
    let response = post_json_auth(
        app,
        &format!("/api/v1/products/{product_id}/testimonials"),
        json!({ "name": name, "text": format!("{name} loves it") }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
