//! Liveness for the deploy: database reachability plus the wasm bundle that
//! `/embed/*` serves to host pages.

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Files `wasm-pack build --target web` must have produced for the loader's
/// `import()` to succeed.
pub const EMBED_BUNDLE_FILES: [&str; 2] = ["kudos_embed.js", "kudos_embed_bg.wasm"];

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok`, `degraded` (widgets cannot load on host pages) or `unavailable`.
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub embed_bundle: bool,
}

impl HealthChecks {
    fn status(&self) -> (StatusCode, &'static str) {
        match (self.database, self.embed_bundle) {
            (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            (true, false) => (StatusCode::OK, "degraded"),
            (true, true) => (StatusCode::OK, "ok"),
        }
    }
}

/// True when every bundle file is present in `dir`.
pub async fn embed_bundle_present(dir: &Path) -> bool {
    for file in EMBED_BUNDLE_FILES {
        if !tokio::fs::try_exists(dir.join(file)).await.unwrap_or(false) {
            return false;
        }
    }
    true
}

/// GET /health
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let checks = HealthChecks {
        database: kudos_db::health_check(&state.pool).await.is_ok(),
        embed_bundle: embed_bundle_present(Path::new(&state.config.embed_assets_dir)).await,
    };
    if !checks.embed_bundle {
        tracing::warn!(dir = %state.config.embed_assets_dir, "Embed bundle missing");
    }
    let (code, status) = checks.status();

    (
        code,
        Json(HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }),
    )
}

/// Root-level, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
