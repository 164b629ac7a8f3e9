//! Mock capability server for testing
//!
//! Wraps a wiremock server and builds client configurations that point at it.

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use RecipeBuddy::config::{CognitiveConfig, RecipesConfig, RepositoryConfig};

pub const SUBSCRIPTION_KEY: &str = "test-subscription-key";
pub const RECIPES_KEY: &str = "test-recipes-key";

/// Mock HTTP server standing in for the external services
pub struct ServiceMockServer {
    pub server: MockServer,
}

impl ServiceMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn cognitive_config(&self) -> CognitiveConfig {
        CognitiveConfig {
            text_analytics_endpoint: self.uri(),
            vision_endpoint: format!("{}/", self.uri()),
            key: SUBSCRIPTION_KEY.to_string(),
            language: "en".to_string(),
            min_confidence: 0.5,
            timeout_seconds: 5,
        }
    }

    pub fn recipes_config(&self, max_recipes: usize) -> RecipesConfig {
        RecipesConfig {
            endpoint: format!("{}/generate", self.uri()),
            key: Some(RECIPES_KEY.to_string()),
            timeout_seconds: 5,
            max_recipes,
        }
    }

    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            base_url: format!("{}/api", self.uri()),
            timeout_seconds: 5,
        }
    }

    /// Respond to `method path` with a JSON body
    pub async fn mock_json(&self, http_method: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `method path` with an empty body
    pub async fn mock_status(&self, http_method: &str, route: &str, status: u16) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received on `route`
    pub async fn request_bodies(&self, route: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == route)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Raw bodies of every request received on `route`
    pub async fn raw_request_bodies(&self, route: &str) -> Vec<Vec<u8>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == route)
            .map(|request| request.body)
            .collect()
    }
}
