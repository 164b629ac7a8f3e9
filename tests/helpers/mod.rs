//! Test helpers module
//!
//! Fake collaborators that record how dialogs call them, and a test context
//! that wires them into a dialog engine over the in-memory state store.

#![allow(dead_code)]

pub mod service_mock;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use RecipeBuddy::config::EngineConfig;
use RecipeBuddy::models::{Attachment, OutboundMessage, Preference, Turn, UserRecord};
use RecipeBuddy::services::{
    IngredientExtractor, ObjectDetector, RecipeGenerator, Services, UserRepository,
};
use RecipeBuddy::state::{
    ConversationState, DialogEngine, DialogRegistry, DialogStack, MemoryStateStore,
    StateStorage, StateStore, UserState,
};
use RecipeBuddy::utils::errors::{CapabilityError, CapabilityResult, RecipeBuddyError, Result};
use RecipeBuddy::utils::helpers::split_list;

pub const CONVERSATION_ID: &str = "conversation-1";
pub const USER_ID: &str = "user-1";
pub const USER_NAME: &str = "Alice";
pub const STATE_PREFIX: &str = "test:";

pub const FRIED_RICE: &str =
    "title: Fried rice\ningredients: rice -- chicken -- soy sauce\ndirections: cook rice -- fry everything";
pub const CHICKEN_SOUP: &str =
    "title: Chicken soup\ningredients: chicken -- water\ndirections: boil -- simmer";

/// A call made against the repository
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryCall {
    GetUser(String),
    UpsertUser { id: String, name: String },
    GetAllergies(String),
    AddAllergies { user_id: String, allergies: Vec<String> },
    AddPreferences { user_id: String, preferences: Vec<Preference> },
}

/// In-memory repository recording every call
#[derive(Debug, Default)]
pub struct RecordingRepository {
    users: Mutex<HashMap<String, String>>,
    allergies: Mutex<HashMap<String, Vec<String>>>,
    calls: Mutex<Vec<RepositoryCall>>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that already knows the user and their allergies
    pub fn with_user(id: &str, name: &str, allergies: &[&str]) -> Self {
        let repository = Self::new();
        repository
            .users
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
        repository.allergies.lock().unwrap().insert(
            id.to_string(),
            allergies.iter().map(|a| a.to_string()).collect(),
        );
        repository
    }

    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RepositoryCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl UserRepository for RecordingRepository {
    async fn get_user(&self, id: &str) -> CapabilityResult<Option<UserRecord>> {
        self.record(RepositoryCall::GetUser(id.to_string()));
        Ok(self.users.lock().unwrap().get(id).map(|name| UserRecord {
            id: id.to_string(),
            name: name.clone(),
        }))
    }

    async fn upsert_user(&self, id: &str, name: &str) -> CapabilityResult<()> {
        self.record(RepositoryCall::UpsertUser {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.users
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
        Ok(())
    }

    async fn get_allergies(&self, user_id: &str) -> CapabilityResult<Vec<String>> {
        self.record(RepositoryCall::GetAllergies(user_id.to_string()));
        Ok(self
            .allergies
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_allergies(&self, user_id: &str, allergies: &[String]) -> CapabilityResult<()> {
        self.record(RepositoryCall::AddAllergies {
            user_id: user_id.to_string(),
            allergies: allergies.to_vec(),
        });
        Ok(())
    }

    async fn add_preferences(
        &self,
        user_id: &str,
        preferences: &[Preference],
    ) -> CapabilityResult<()> {
        self.record(RepositoryCall::AddPreferences {
            user_id: user_id.to_string(),
            preferences: preferences.to_vec(),
        });
        Ok(())
    }
}

/// Extracts comma separated terms, like a very literal key phrase service
#[derive(Debug, Default)]
pub struct FakeExtractor;

#[async_trait]
impl IngredientExtractor for FakeExtractor {
    async fn extract_terms(&self, texts: &[String]) -> CapabilityResult<Option<Vec<String>>> {
        let terms: Vec<String> = texts.iter().flat_map(|text| split_list(text)).collect();
        Ok((!terms.is_empty()).then_some(terms))
    }
}

/// Detects a fixed set of objects in every call
#[derive(Debug, Default)]
pub struct FakeDetector {
    objects: Vec<String>,
    calls: Mutex<Vec<Vec<Attachment>>>,
}

impl FakeDetector {
    pub fn detecting(objects: &[&str]) -> Self {
        Self {
            objects: objects.iter().map(|o| o.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Attachment>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectDetector for FakeDetector {
    async fn detect_objects(&self, attachments: &[Attachment]) -> CapabilityResult<Vec<String>> {
        self.calls.lock().unwrap().push(attachments.to_vec());
        Ok(self.objects.clone())
    }
}

/// Returns canned recipes, or fails when built with `failing`
#[derive(Debug, Default)]
pub struct FakeGenerator {
    recipes: Vec<String>,
    fail: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeGenerator {
    pub fn returning(recipes: &[&str]) -> Self {
        Self {
            recipes: recipes.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeGenerator for FakeGenerator {
    async fn generate(&self, ingredients: &[String]) -> CapabilityResult<Vec<String>> {
        self.calls.lock().unwrap().push(ingredients.to_vec());
        if self.fail {
            return Err(CapabilityError::ServiceUnavailable { service: "recipes" });
        }
        Ok(self.recipes.clone())
    }
}

/// In-memory store refusing writes to keys of one scope (or to every key)
#[derive(Debug, Default)]
pub struct FailingStore {
    pub records: MemoryStateStore,
    failing_scope: Option<&'static str>,
}

impl FailingStore {
    pub fn all() -> Self {
        Self::default()
    }

    /// Fail only writes whose key belongs to `scope` ("stack", "conversation", "user")
    pub fn on_scope(scope: &'static str) -> Self {
        Self {
            records: MemoryStateStore::new(),
            failing_scope: Some(scope),
        }
    }

    fn refuses(&self, key: &str) -> bool {
        match self.failing_scope {
            Some(scope) => key.contains(&format!("{}:", scope)),
            None => true,
        }
    }
}

#[async_trait]
impl StateStore for FailingStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.records.load(key).await
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        if self.refuses(key) {
            return Err(RecipeBuddyError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.records.save(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.delete(key).await
    }
}

/// Dialog engine wired to fakes, plus handles to inspect them
pub struct TestContext {
    pub engine: DialogEngine,
    pub store: Arc<MemoryStateStore>,
    pub storage: StateStorage,
    pub repository: Arc<RecordingRepository>,
    pub detector: Arc<FakeDetector>,
    pub generator: Arc<FakeGenerator>,
}

impl TestContext {
    /// Context for a user the repository has never seen
    pub fn new() -> Self {
        Self::build(
            RecordingRepository::new(),
            FakeDetector::detecting(&["tomato", "egg"]),
            FakeGenerator::returning(&[FRIED_RICE, CHICKEN_SOUP]),
        )
    }

    /// Context for a returning user with the given stored allergies
    pub fn returning_user(allergies: &[&str]) -> Self {
        Self::build(
            RecordingRepository::with_user(USER_ID, USER_NAME, allergies),
            FakeDetector::detecting(&["tomato", "egg"]),
            FakeGenerator::returning(&[FRIED_RICE, CHICKEN_SOUP]),
        )
    }

    pub fn build(
        repository: RecordingRepository,
        detector: FakeDetector,
        generator: FakeGenerator,
    ) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let store = Arc::new(MemoryStateStore::new());
        let storage = StateStorage::new(store.clone(), STATE_PREFIX);
        let repository = Arc::new(repository);
        let detector = Arc::new(detector);
        let generator = Arc::new(generator);

        let services = Services::new(
            Arc::new(FakeExtractor),
            detector.clone(),
            generator.clone(),
            repository.clone(),
        );
        let engine = DialogEngine::new(
            storage.clone(),
            DialogRegistry::new(),
            services,
            EngineConfig::default(),
        )
        .expect("default registry registers the root dialog");

        Self {
            engine,
            store,
            storage,
            repository,
            detector,
            generator,
        }
    }

    /// Process a turn and return the outbound messages
    pub async fn send(&self, turn: Turn) -> Vec<OutboundMessage> {
        self.engine
            .process_turn(&turn.with_user_name(USER_NAME))
            .await
            .expect("turn should succeed")
    }

    /// Announce presence and return the reply texts
    pub async fn start(&self) -> Vec<String> {
        texts(&self.send(Turn::presence(CONVERSATION_ID, USER_ID)).await)
    }

    /// Send a text message and return the reply texts
    pub async fn say(&self, text: &str) -> Vec<String> {
        texts(&self.send(Turn::text(CONVERSATION_ID, USER_ID, text)).await)
    }

    pub async fn stack(&self) -> DialogStack {
        self.storage
            .load_stack(CONVERSATION_ID)
            .await
            .expect("stack should load")
    }

    pub async fn conversation(&self) -> ConversationState {
        self.storage.load_conversation(CONVERSATION_ID).await
    }

    pub async fn user(&self) -> UserState {
        self.storage.load_user(USER_ID).await
    }

    /// Drive a new user through consent (yes) without allergies
    pub async fn complete_welcome(&self) {
        self.start().await;
        self.say("yes").await;
        self.say("no").await;
    }
}

pub fn texts(messages: &[OutboundMessage]) -> Vec<String> {
    messages.iter().map(|m| m.text.clone()).collect()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
