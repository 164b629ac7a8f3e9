//! Key phrase extraction client
//!
//! Sends free text to the text analytics key phrase endpoint and returns the
//! phrases as ingredient terms.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{check_status, elapsed_ms, IngredientExtractor};
use crate::config::CognitiveConfig;
use crate::utils::errors::{CapabilityError, CapabilityResult, RecipeBuddyError, Result};
use crate::utils::helpers::{dedup_terms, normalize_term};
use crate::utils::logging::log_capability_call;

const SERVICE: &str = "text_analytics";
const KEY_PHRASES_PATH: &str = "text/analytics/v3.1/keyPhrases";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Serialize)]
struct KeyPhraseRequest<'a> {
    documents: Vec<KeyPhraseDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct KeyPhraseDocument<'a> {
    id: String,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct KeyPhraseResponse {
    #[serde(default)]
    documents: Vec<KeyPhraseResult>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyPhraseResult {
    id: String,
    #[serde(default)]
    key_phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    id: String,
    #[serde(default)]
    error: serde_json::Value,
}

/// Text analytics key phrase client
#[derive(Debug, Clone)]
pub struct TextAnalyticsClient {
    client: Client,
    endpoint: String,
    key: String,
    language: String,
}

impl TextAnalyticsClient {
    pub fn new(config: &CognitiveConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("RecipeBuddy-Bot/1.0")
            .build()
            .map_err(RecipeBuddyError::Http)?;

        Ok(Self {
            client,
            endpoint: config.text_analytics_endpoint.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            language: config.language.clone(),
        })
    }

    async fn request(&self, texts: &[String]) -> CapabilityResult<KeyPhraseResponse> {
        let body = KeyPhraseRequest {
            documents: texts
                .iter()
                .enumerate()
                .map(|(i, text)| KeyPhraseDocument {
                    id: (i + 1).to_string(),
                    language: &self.language,
                    text,
                })
                .collect(),
        };

        let url = format!("{}/{}", self.endpoint, KEY_PHRASES_PATH);
        debug!(url = %url, documents = texts.len(), "Requesting key phrases");

        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::from_reqwest(SERVICE, e))?;

        check_status(SERVICE, response)
            .await?
            .json::<KeyPhraseResponse>()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl IngredientExtractor for TextAnalyticsClient {
    async fn extract_terms(&self, texts: &[String]) -> CapabilityResult<Option<Vec<String>>> {
        let texts: Vec<String> = texts
            .iter()
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .collect();
        if texts.is_empty() {
            return Ok(None);
        }

        let started = Instant::now();
        let result = self.request(&texts).await;
        log_capability_call(SERVICE, "extract_terms", elapsed_ms(started), result.is_ok());
        let response = result?;

        for failed in &response.errors {
            warn!(document_id = %failed.id, error = %failed.error, "Key phrase extraction failed for document");
        }

        let mut documents = response.documents;
        documents.sort_by_key(|doc| doc.id.parse::<usize>().unwrap_or(usize::MAX));
        let terms = dedup_terms(
            documents
                .into_iter()
                .flat_map(|doc| doc.key_phrases)
                .map(|phrase| normalize_term(&phrase))
                .filter(|phrase| !phrase.is_empty()),
        );

        if terms.is_empty() {
            Ok(None)
        } else {
            Ok(Some(terms))
        }
    }
}
