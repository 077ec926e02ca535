//! In-memory fetcher for tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use parking_lot::Mutex;

use quiz_net::{FetchError, FetchResponse, Fetcher, JsonResponse};

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FetchResponse>,
    replies: HashMap<String, Value>,
    gets: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Value)>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_status_page(url, 200, body)
    }

    pub fn with_status_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_reply(mut self, url: &str, reply: Value) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().clone()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.gets.lock().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::InvalidUrl(format!("no route to {url}")))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<JsonResponse, FetchError> {
        self.posts.lock().push((url.to_string(), body.clone()));
        self.replies
            .get(url)
            .cloned()
            .map(|body| JsonResponse { status: 200, body })
            .ok_or_else(|| FetchError::InvalidUrl(format!("no route to {url}")))
    }
}
