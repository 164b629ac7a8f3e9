//! Services module
//!
//! This module defines the external collaborators dialogs consult during a
//! turn (ingredient extraction, object detection, recipe generation and the
//! user repository) and their HTTP clients.

pub mod recipes;
pub mod repository;
pub mod text_analytics;
pub mod vision;

// Re-export commonly used services
pub use recipes::RecipeGeneratorClient;
pub use repository::RepositoryClient;
pub use text_analytics::TextAnalyticsClient;
pub use vision::VisionClient;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Instant;

use crate::config::settings::Settings;
use crate::models::{Attachment, Preference, UserRecord};
use crate::utils::errors::{CapabilityError, CapabilityResult, Result};

/// Key phrase extraction over free text
#[async_trait]
pub trait IngredientExtractor: Send + Sync {
    /// Terms understood from the texts; `None` when nothing was understood
    async fn extract_terms(&self, texts: &[String]) -> CapabilityResult<Option<Vec<String>>>;
}

/// Object detection over image attachments
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Deduplicated object names above the confidence threshold
    async fn detect_objects(&self, attachments: &[Attachment]) -> CapabilityResult<Vec<String>>;
}

/// Recipe generation from ingredient terms
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(&self, ingredients: &[String]) -> CapabilityResult<Vec<String>>;
}

/// Durable user records
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: &str) -> CapabilityResult<Option<UserRecord>>;
    async fn upsert_user(&self, id: &str, name: &str) -> CapabilityResult<()>;
    async fn get_allergies(&self, user_id: &str) -> CapabilityResult<Vec<String>>;
    async fn add_allergies(&self, user_id: &str, allergies: &[String]) -> CapabilityResult<()>;
    async fn add_preferences(
        &self,
        user_id: &str,
        preferences: &[Preference],
    ) -> CapabilityResult<()>;
}

/// Service factory holding every collaborator the dialogs may call
#[derive(Clone)]
pub struct Services {
    pub extractor: Arc<dyn IngredientExtractor>,
    pub detector: Arc<dyn ObjectDetector>,
    pub generator: Arc<dyn RecipeGenerator>,
    pub repository: Arc<dyn UserRepository>,
}

impl Services {
    /// Assemble services from explicit collaborators
    pub fn new(
        extractor: Arc<dyn IngredientExtractor>,
        detector: Arc<dyn ObjectDetector>,
        generator: Arc<dyn RecipeGenerator>,
        repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            extractor,
            detector,
            generator,
            repository,
        }
    }

    /// Create the HTTP clients described by the settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let extractor = TextAnalyticsClient::new(&settings.cognitive)?;
        let detector = VisionClient::new(&settings.cognitive)?;
        let generator = RecipeGeneratorClient::new(&settings.recipes)?;
        let repository = RepositoryClient::new(&settings.repository)?;

        Ok(Self::new(
            Arc::new(extractor),
            Arc::new(detector),
            Arc::new(generator),
            Arc::new(repository),
        ))
    }

    /// Services whose every call fails as unavailable
    #[cfg(test)]
    pub(crate) fn unavailable() -> Self {
        let unavailable = Arc::new(Unavailable);
        Self::new(
            unavailable.clone(),
            unavailable.clone(),
            unavailable.clone(),
            unavailable,
        )
    }
}

/// Turn a non-success status into a capability error
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> CapabilityResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(CapabilityError::ServiceUnavailable { service });
    }
    let body = response.text().await.unwrap_or_default();
    Err(CapabilityError::RequestFailed {
        service,
        reason: format!("HTTP {}: {}", status, body),
    })
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
struct Unavailable;
