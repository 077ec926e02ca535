//! HTTP fetcher
//!
//! The solver only talks to the network through the [`Fetcher`] trait, so
//! tests can substitute deterministic in-memory fakes.

use async_trait::async_trait;
use reqwest::{redirect, Client};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use quiz_core::DEFAULT_TIMEOUT_SECS;

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum redirects followed per request
    pub max_redirects: usize,
    /// Fixed user agent (random browser agent when unset)
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// The configured user agent, else one of [`BROWSER_AGENTS`] at random
    pub fn resolve_user_agent(&self) -> String {
        use rand::seq::SliceRandom;

        self.user_agent
            .clone()
            .or_else(|| {
                BROWSER_AGENTS
                    .choose(&mut rand::thread_rng())
                    .map(|agent| agent.to_string())
            })
            .unwrap_or_else(|| concat!("quiz-chain/", env!("CARGO_PKG_VERSION")).to_string())
    }
}

/// Browser identities some quiz hosts expect
pub const BROWSER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
];

/// Transport errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Response from {url} (status {status}) is not JSON: {reason}")]
    NotJson {
        url: String,
        status: u16,
        reason: String,
    },
}

/// Raw text response
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Parsed JSON response
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

/// Content fetcher used for quiz pages, submissions and linked files
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL and return its body whatever the status
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// POST a JSON body and parse the JSON reply whatever the status
    async fn post_json(&self, url: &str, body: &Value) -> Result<JsonResponse, FetchError>;
}

/// reqwest-backed fetcher; one instance per chain run
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.resolve_user_agent())
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    fn check_url(url: &str) -> Result<reqwest::Url, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let target = Self::check_url(url)?;
        debug!("GET {}", url);

        let response = self.client.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned status: {}", url, status);
        }

        let body = response.text().await?;
        Ok(FetchResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<JsonResponse, FetchError> {
        let target = Self::check_url(url)?;
        debug!("POST {}", url);

        let response = self.client.post(target).json(body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = serde_json::from_str(&text).map_err(|e| FetchError::NotJson {
            url: url.to_string(),
            status,
            reason: e.to_string(),
        })?;

        Ok(JsonResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_resolve_user_agent() {
        let browser = FetchConfig::default().resolve_user_agent();
        assert!(BROWSER_AGENTS.contains(&browser.as_str()));

        let fixed = FetchConfig::default().with_user_agent("quiz-chain-test/1.0");
        assert_eq!(fixed.resolve_user_agent(), "quiz-chain-test/1.0");
    }

    #[tokio::test]
    async fn test_configured_user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quiz"))
            .and(header("user-agent", "quiz-chain-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let config = FetchConfig::default().with_user_agent("quiz-chain-test/1.0");
        let fetcher = HttpFetcher::new(&config).unwrap();
        let response = fetcher.get(&format!("{}/quiz", server.uri())).await.unwrap();

        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn test_get_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>moved</p>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let response = fetcher.get(&format!("{}/old", server.uri())).await.unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, "<p>moved</p>");
    }

    #[tokio::test]
    async fn test_post_json_keeps_error_status_body() {
        let server = MockServer::start().await;
        let payload = json!({"email": "a@b.c", "secret": "s", "url": "u", "answer": "1"});
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_json(&payload))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"correct": false, "url": "next"})),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let response = fetcher
            .post_json(&format!("{}/submit", server.uri()), &payload)
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(response.body["url"], "next");
    }

    #[tokio::test]
    async fn test_post_json_rejects_non_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher
            .post_json(&format!("{}/submit", server.uri()), &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NotJson { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.get("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
