//! Turn context and persisted state bags
//!
//! This module holds the per-conversation and per-user state bags, the
//! typed value bag private to each dialog instance, and the context handed
//! to every dialog step while a turn is processed.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::models::OutboundMessage;
use crate::services::Services;
use crate::utils::errors::Result;

/// Keys a dialog may store in its instance value bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKey {
    /// Allergy terms being captured or filtered against
    Allergies,
    /// Ingredient terms extracted from the user's input
    Ingredients,
    /// Generated recipe texts offered to the user
    Recipes,
    /// Indexes of recipes the user marked as preferred
    RecipesSelected,
}

/// Instance-private value bag keyed by the closed [`ValueKey`] set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogValues {
    entries: BTreeMap<ValueKey, serde_json::Value>,
}

impl DialogValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used when seeding dialog options
    pub fn with<T: Serialize>(mut self, key: ValueKey, value: T) -> Result<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn set<T: Serialize>(&mut self, key: ValueKey, value: T) -> Result<()> {
        self.entries.insert(key, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: ValueKey) -> Result<Option<T>> {
        match self.entries.get(&key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Typed read that treats a missing key as the type's default
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: ValueKey) -> Result<T> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn remove(&mut self, key: ValueKey) -> Option<serde_json::Value> {
        self.entries.remove(&key)
    }

    pub fn contains(&self, key: ValueKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-conversation bag of cross-dialog flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub did_welcome: bool,
    #[serde(default)]
    pub turn_count: u64,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl ConversationState {
    /// Record that a turn was processed
    pub fn touch(&mut self) {
        self.turn_count += 1;
        self.last_activity = Some(Utc::now());
    }
}

/// Per-user bag: identity, allergies and tracking consent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
    #[serde(default)]
    pub allow_tracking: Option<bool>,
}

impl UserState {
    pub fn tracking_allowed(&self) -> bool {
        self.allow_tracking.unwrap_or(false)
    }

    pub fn allergies(&self) -> &[String] {
        self.allergies.as_deref().unwrap_or(&[])
    }
}

/// Everything a dialog step may read or mutate during a turn besides its
/// own instance values
pub struct TurnContext {
    pub conversation_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub conversation: ConversationState,
    pub user: UserState,
    pub services: Services,
    pub config: Arc<EngineConfig>,
    outbound: Vec<OutboundMessage>,
}

impl TurnContext {
    pub fn new(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: Option<String>,
        conversation: ConversationState,
        user: UserState,
        services: Services,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            user_name,
            conversation,
            user,
            services,
            config,
            outbound: Vec::new(),
        }
    }

    /// Queue a plain text message
    pub fn send(&mut self, text: impl Into<String>) {
        self.outbound.push(OutboundMessage::text(text));
    }

    pub fn send_all(&mut self, messages: impl IntoIterator<Item = OutboundMessage>) {
        self.outbound.extend(messages);
    }

    pub fn take_outbound(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbound)
    }

    /// Best name to address the user by
    pub fn display_name(&self) -> String {
        self.user
            .name
            .clone()
            .or_else(|| self.user_name.clone())
            .unwrap_or_else(|| "there".to_string())
    }
}
