//! Object detection client
//!
//! Asks the computer vision detect endpoint for the objects in each image
//! attachment and keeps the confidently detected ones as ingredient terms.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{check_status, elapsed_ms, ObjectDetector};
use crate::config::CognitiveConfig;
use crate::models::Attachment;
use crate::utils::errors::{CapabilityError, CapabilityResult, RecipeBuddyError, Result};
use crate::utils::helpers::{dedup_terms, normalize_term};
use crate::utils::logging::log_capability_call;

const SERVICE: &str = "vision";
const DETECT_PATH: &str = "vision/v3.2/detect";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    objects: Vec<DetectedObject>,
}

#[derive(Debug, Deserialize)]
struct DetectedObject {
    object: String,
    confidence: f64,
}

/// Computer vision object detection client
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: Client,
    endpoint: String,
    key: String,
    min_confidence: f64,
}

impl VisionClient {
    pub fn new(config: &CognitiveConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("RecipeBuddy-Bot/1.0")
            .build()
            .map_err(RecipeBuddyError::Http)?;

        Ok(Self {
            client,
            endpoint: config.vision_endpoint.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            min_confidence: config.min_confidence,
        })
    }

    async fn detect(&self, attachment: &Attachment) -> CapabilityResult<Vec<String>> {
        let url = format!("{}/{}", self.endpoint, DETECT_PATH);
        debug!(content_type = %attachment.content_type, "Detecting objects in attachment");

        let request = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key);
        // Fetched content is uploaded; only content-less attachments are sent by URL
        let request = match &attachment.data {
            Some(data) => request
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(data.clone()),
            None => request.json(&DetectRequest {
                url: &attachment.source_ref,
            }),
        };

        let response = request
            .send()
            .await
            .map_err(|e| CapabilityError::from_reqwest(SERVICE, e))?;

        let detected = check_status(SERVICE, response)
            .await?
            .json::<DetectResponse>()
            .await
            .map_err(|e| CapabilityError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        Ok(detected
            .objects
            .into_iter()
            .filter(|object| object.confidence >= self.min_confidence)
            .map(|object| normalize_term(&object.object))
            .filter(|name| !name.is_empty())
            .collect())
    }
}

#[async_trait]
impl ObjectDetector for VisionClient {
    async fn detect_objects(&self, attachments: &[Attachment]) -> CapabilityResult<Vec<String>> {
        let started = Instant::now();
        let mut names = Vec::new();

        for attachment in attachments {
            match self.detect(attachment).await {
                Ok(found) => names.extend(found),
                Err(e) => {
                    log_capability_call(SERVICE, "detect_objects", elapsed_ms(started), false);
                    return Err(e);
                }
            }
        }

        log_capability_call(SERVICE, "detect_objects", elapsed_ms(started), true);
        Ok(dedup_terms(names))
    }
}
