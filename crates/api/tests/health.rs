mod common;

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use common::{body_json, get, StubFetcher};
use kudos_api::routes::health::EMBED_BUNDLE_FILES;
use sqlx::PgPool;

/// A fresh directory under the system temp dir, optionally holding the
/// wasm bundle.
fn assets_dir(with_bundle: bool) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kudos-embed-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    if with_bundle {
        for file in EMBED_BUNDLE_FILES {
            std::fs::write(dir.join(file), b"").unwrap();
        }
    }
    dir
}

fn app_serving(pool: PgPool, dir: &Path) -> axum::Router {
    let mut config = common::test_config();
    config.embed_assets_dir = dir.to_string_lossy().into_owned();
    common::build_test_app_with(pool, config, StubFetcher::default())
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_ok_with_database_and_bundle(pool: PgPool) {
    let dir = assets_dir(true);
    let app = app_serving(pool, &dir);

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["database"], true);
    assert_eq!(json["checks"]["embed_bundle"], true);
    std::fs::remove_dir_all(dir).ok();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_degraded_without_bundle(pool: PgPool) {
    let dir = assets_dir(false);
    std::fs::write(dir.join(EMBED_BUNDLE_FILES[0]), b"").unwrap();
    let app = app_serving(pool, &dir);

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"], true);
    assert_eq!(json["checks"]["embed_bundle"], false);
    std::fs::remove_dir_all(dir).ok();
}
