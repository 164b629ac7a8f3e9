//! State storage implementation
//!
//! This module persists the dialog stack and the conversation and user
//! state bags. Backends only move raw JSON records; [`StateStorage`]
//! applies the load/save contract on top of them.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::context::{ConversationState, UserState};
use super::stack::DialogStack;
use crate::config::{StorageBackend, StorageConfig};
use crate::utils::errors::{RecipeBuddyError, Result};

/// Raw record store keyed by fully-qualified key
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: String) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Redis-backed record store
#[derive(Clone)]
pub struct RedisStateStore {
    connection_manager: redis::aio::ConnectionManager,
    ttl_seconds: Option<u64>,
}

impl RedisStateStore {
    pub async fn new(url: &str, ttl_seconds: Option<u64>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        info!(ttl_seconds = ?ttl_seconds, "Connected Redis state store");
        Ok(Self {
            connection_manager,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        match self.ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(key).await?;
        debug!(key = %key, deleted = deleted, "Deleted state record");
        Ok(())
    }
}

/// In-process record store, used for local runs and tests
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        self.records.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }
}

/// Which persisted record a key refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKey {
    Stack(String),
    Conversation(String),
    User(String),
}

impl ScopeKey {
    pub fn scope(&self) -> &'static str {
        match self {
            ScopeKey::Stack(_) => "stack",
            ScopeKey::Conversation(_) => "conversation",
            ScopeKey::User(_) => "user",
        }
    }

    fn id(&self) -> &str {
        match self {
            ScopeKey::Stack(id) | ScopeKey::Conversation(id) | ScopeKey::User(id) => id,
        }
    }
}

/// Typed access to the persisted stack and state bags
#[derive(Clone)]
pub struct StateStorage {
    store: Arc<dyn StateStore>,
    prefix: String,
}

impl StateStorage {
    pub fn new(store: Arc<dyn StateStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Build storage for the configured backend
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let store: Arc<dyn StateStore> = match config.backend {
            StorageBackend::Redis => {
                Arc::new(RedisStateStore::new(&config.redis_url, config.ttl_seconds).await?)
            }
            StorageBackend::Memory => {
                warn!("Using in-memory state store; conversations will not survive a restart");
                Arc::new(MemoryStateStore::new())
            }
        };

        Ok(Self::new(store, config.prefix.clone()))
    }

    pub fn key(&self, scope: &ScopeKey) -> String {
        format!("{}{}:{}", self.prefix, scope.scope(), scope.id())
    }

    /// Load the dialog stack; a missing or unreadable record is an idle stack,
    /// an undecodable one is corrupt
    pub async fn load_stack(&self, conversation_id: &str) -> Result<DialogStack> {
        let key = self.key(&ScopeKey::Stack(conversation_id.to_string()));

        let raw = match self.store.load(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load dialog stack, starting idle");
                None
            }
        };

        match raw {
            Some(data) => serde_json::from_str(&data).map_err(|e| {
                error!(key = %key, error = %e, "Persisted dialog stack is corrupt");
                RecipeBuddyError::CorruptStackState {
                    conversation_id: conversation_id.to_string(),
                    reason: e.to_string(),
                }
            }),
            None => Ok(DialogStack::new()),
        }
    }

    pub async fn save_stack(&self, conversation_id: &str, stack: &DialogStack) -> Result<()> {
        let key = self.key(&ScopeKey::Stack(conversation_id.to_string()));
        self.save_record(&key, stack).await
    }

    pub async fn load_conversation(&self, conversation_id: &str) -> ConversationState {
        let key = self.key(&ScopeKey::Conversation(conversation_id.to_string()));
        self.load_bag(&key).await
    }

    pub async fn save_conversation(
        &self,
        conversation_id: &str,
        state: &ConversationState,
    ) -> Result<()> {
        let key = self.key(&ScopeKey::Conversation(conversation_id.to_string()));
        self.save_record(&key, state).await
    }

    pub async fn load_user(&self, user_id: &str) -> UserState {
        let key = self.key(&ScopeKey::User(user_id.to_string()));
        self.load_bag(&key).await
    }

    pub async fn save_user(&self, user_id: &str, state: &UserState) -> Result<()> {
        let key = self.key(&ScopeKey::User(user_id.to_string()));
        self.save_record(&key, state).await
    }

    /// Drop the stack and conversation bag, returning the conversation to idle
    pub async fn clear_conversation(&self, conversation_id: &str) -> Result<()> {
        for scope in [
            ScopeKey::Stack(conversation_id.to_string()),
            ScopeKey::Conversation(conversation_id.to_string()),
        ] {
            let key = self.key(&scope);
            self.store.delete(&key).await.map_err(|e| RecipeBuddyError::StateSave {
                key,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Whole-bag read; any failure yields a fresh bag
    async fn load_bag<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.load(key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(bag) => bag,
                Err(e) => {
                    warn!(key = %key, error = %e, "Undecodable state bag, using fresh state");
                    T::default()
                }
            },
            Ok(None) => {
                debug!(key = %key, "No state bag found, using fresh state");
                T::default()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load state bag, using fresh state");
                T::default()
            }
        }
    }

    async fn save_record<T: Serialize>(&self, key: &str, record: &T) -> Result<()> {
        let serialized = serde_json::to_string(record)?;
        debug!(key = %key, data_length = serialized.len(), "Saving state record");

        self.store.save(key, serialized).await.map_err(|e| {
            error!(key = %key, error = %e, "Failed to save state record");
            RecipeBuddyError::StateSave {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
