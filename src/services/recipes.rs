//! Recipe generation client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{check_status, elapsed_ms, RecipeGenerator};
use crate::config::RecipesConfig;
use crate::utils::errors::{CapabilityError, CapabilityResult, RecipeBuddyError, Result};
use crate::utils::logging::log_capability_call;

const SERVICE: &str = "recipes";
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    ingredients: &'a [String],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    recipes: Vec<String>,
}

/// HTTP client for the recipe generation service
#[derive(Debug, Clone)]
pub struct RecipeGeneratorClient {
    client: Client,
    endpoint: String,
    key: Option<String>,
    max_recipes: usize,
}

impl RecipeGeneratorClient {
    pub fn new(config: &RecipesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("RecipeBuddy-Bot/1.0")
            .build()
            .map_err(RecipeBuddyError::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            key: config.key.clone(),
            max_recipes: config.max_recipes,
        })
    }

    async fn request(&self, ingredients: &[String]) -> CapabilityResult<GenerateResponse> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { ingredients });
        if let Some(key) = &self.key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CapabilityError::from_reqwest(SERVICE, e))?;

        check_status(SERVICE, response)
            .await?
            .json::<GenerateResponse>()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl RecipeGenerator for RecipeGeneratorClient {
    async fn generate(&self, ingredients: &[String]) -> CapabilityResult<Vec<String>> {
        debug!(ingredients = ?ingredients, "Generating recipes");

        let started = Instant::now();
        let result = self.request(ingredients).await;
        log_capability_call(SERVICE, "generate", elapsed_ms(started), result.is_ok());

        Ok(result?
            .recipes
            .into_iter()
            .filter(|recipe| !recipe.trim().is_empty())
            .take(self.max_recipes)
            .collect())
    }
}
