//! reqwest-backed [`PageFetcher`] used by URL import.

use std::time::Duration;

use async_trait::async_trait;
use kudos_core::importer::{FetchError, PageFetcher};
use reqwest::header::USER_AGENT;
use reqwest::redirect::Policy;
use url::Url;

const MAX_REDIRECTS: usize = 5;

/// Follow redirects only within the host that was originally requested, so
/// an allowed page cannot bounce the server onto another address.
fn same_host_redirects() -> Policy {
    Policy::custom(|attempt| {
        let origin = attempt.previous().first().and_then(|url| url.host_str());
        if attempt.previous().len() > MAX_REDIRECTS || origin != attempt.url().host_str() {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Fetches oEmbed documents and listing pages over HTTP.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(same_host_redirects())
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    async fn get(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_json(&self, url: &Url) -> Result<serde_json::Value, FetchError> {
        let response = self.get(self.client.get(url.clone())).await?;
        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn fetch_html(&self, url: &Url, user_agent: &str) -> Result<String, FetchError> {
        let response = self
            .get(self.client.get(url.clone()).header(USER_AGENT, user_agent))
            .await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Redirect;
    use axum::routing::get;
    use axum::Router;

    /// Serve a tiny site on an ephemeral port; returns its `127.0.0.1` origin.
    async fn serve_pages() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = Router::new()
            .route("/listing", get(|| async { "<meta property=\"og:title\" content=\"Kudos\">" }))
            .route("/moved", get(|| async { Redirect::temporary("/listing") }))
            .route(
                "/elsewhere",
                get(move || async move {
                    Redirect::temporary(&format!("http://localhost:{port}/listing"))
                }),
            );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn follows_redirects_on_the_same_host() {
        let origin = serve_pages().await;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(5));
        let url = Url::parse(&format!("{origin}/moved")).unwrap();

        let html = fetcher.fetch_html(&url, "test-agent").await.unwrap();

        assert!(html.contains("og:title"));
    }

    #[tokio::test]
    async fn refuses_redirects_to_another_host() {
        let origin = serve_pages().await;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(5));
        let url = Url::parse(&format!("{origin}/elsewhere")).unwrap();

        let result = fetcher.fetch_html(&url, "test-agent").await;

        assert!(matches!(result, Err(FetchError::Status(307))), "{result:?}");
    }
}
