//! User repository HTTP client
//!
//! Thin client over the repository API that stores user profiles,
//! allergies and recipe preferences.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use super::{check_status, elapsed_ms, UserRepository};
use crate::config::RepositoryConfig;
use crate::models::{AllergyRecord, Preference, PreferenceRecord, UserRecord};
use crate::utils::errors::{CapabilityError, CapabilityResult, RecipeBuddyError, Result};
use crate::utils::logging::log_capability_call;

const SERVICE: &str = "repository";

/// HTTP client for the user repository API
#[derive(Debug, Clone)]
pub struct RepositoryClient {
    client: Client,
    base_url: Url,
}

impl RepositoryClient {
    pub fn new(config: &RepositoryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("RecipeBuddy-Bot/1.0")
            .build()
            .map_err(RecipeBuddyError::Http)?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
        })
    }

    fn url(&self, path: &str) -> CapabilityResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CapabilityError::RequestFailed {
                service: SERVICE,
                reason: format!("invalid path {}: {}", path, e),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
    ) -> CapabilityResult<Option<T>> {
        let url = self.url(path)?;
        debug!(operation = operation, url = %url, "Repository GET");

        let started = Instant::now();
        let result: CapabilityResult<Option<T>> = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| CapabilityError::from_reqwest(SERVICE, e))?;

            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let response = check_status(SERVICE, response).await?;

            response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| CapabilityError::InvalidResponse {
                    service: SERVICE,
                    reason: e.to_string(),
                })
        }
        .await;

        log_capability_call(SERVICE, operation, elapsed_ms(started), result.is_ok());
        result
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> CapabilityResult<()> {
        let url = self.url(path)?;
        debug!(operation = operation, url = %url, "Repository POST");

        let started = Instant::now();
        let result: CapabilityResult<()> = async {
            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| CapabilityError::from_reqwest(SERVICE, e))?;
            check_status(SERVICE, response).await.map(|_| ())
        }
        .await;

        log_capability_call(SERVICE, operation, elapsed_ms(started), result.is_ok());
        result
    }
}

#[async_trait]
impl UserRepository for RepositoryClient {
    async fn get_user(&self, id: &str) -> CapabilityResult<Option<UserRecord>> {
        let path = format!("users/{}", urlencoding::encode(id));
        let rows: Option<Vec<UserRecord>> = self.get_json("get_user", &path).await?;
        Ok(rows.and_then(|rows| rows.into_iter().next()))
    }

    async fn upsert_user(&self, id: &str, name: &str) -> CapabilityResult<()> {
        let body = UserRecord {
            id: id.to_string(),
            name: name.to_string(),
        };
        self.post_json("upsert_user", "users", &body).await
    }

    async fn get_allergies(&self, user_id: &str) -> CapabilityResult<Vec<String>> {
        let path = format!("users/{}/allergies", urlencoding::encode(user_id));
        let rows: Option<Vec<AllergyRecord>> = self.get_json("get_allergies", &path).await?;
        Ok(rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.allergy)
            .collect())
    }

    async fn add_allergies(&self, user_id: &str, allergies: &[String]) -> CapabilityResult<()> {
        let rows: Vec<AllergyRecord> = allergies
            .iter()
            .map(|allergy| AllergyRecord {
                user_id: user_id.to_string(),
                allergy: allergy.clone(),
            })
            .collect();
        self.post_json("add_allergies", "allergies", &rows).await
    }

    async fn add_preferences(
        &self,
        user_id: &str,
        preferences: &[Preference],
    ) -> CapabilityResult<()> {
        let rows: Vec<PreferenceRecord<'_>> = preferences
            .iter()
            .map(|preference| PreferenceRecord {
                user_id,
                recipe: &preference.recipe,
                marked_as_preference: preference.marked_as_preference,
            })
            .collect();
        self.post_json("add_preferences", "preferences", &rows).await
    }
}
