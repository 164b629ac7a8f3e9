//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::state::DialogId;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub repository: RepositoryConfig,
    pub cognitive: CognitiveConfig,
    pub recipes: RecipesConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub webhook_url: Option<String>,
}

/// Which state store backs the dialog engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Redis,
    Memory,
}

/// State storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub redis_url: String,
    pub prefix: String,
    /// Expiry for state records; `None` keeps them indefinitely
    pub ttl_seconds: Option<u64>,
}

/// User repository HTTP API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Text analytics and computer vision configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CognitiveConfig {
    pub text_analytics_endpoint: String,
    pub vision_endpoint: String,
    pub key: String,
    pub language: String,
    pub min_confidence: f64,
    pub timeout_seconds: u64,
}

/// Recipe generation service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecipesConfig {
    pub endpoint: String,
    pub key: Option<String>,
    pub timeout_seconds: u64,
    pub max_recipes: usize,
}

/// Dialog engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Dialog started when a turn arrives for an idle conversation
    pub root_dialog: DialogId,
    /// Upper bound on transitions applied within a single turn
    pub max_steps_per_turn: usize,
    /// Attachment content types accepted as ingredient photos
    pub image_content_types: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("RECIPEBUDDY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("engine.image_content_types")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::RecipeBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_dialog: DialogId::Root,
            max_steps_per_turn: 64,
            image_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                webhook_url: None,
            },
            storage: StorageConfig {
                backend: StorageBackend::Redis,
                redis_url: "redis://localhost:6379".to_string(),
                prefix: "recipebuddy:".to_string(),
                ttl_seconds: None,
            },
            repository: RepositoryConfig {
                base_url: "http://localhost:7071/api/".to_string(),
                timeout_seconds: 10,
            },
            cognitive: CognitiveConfig {
                text_analytics_endpoint: "http://localhost:7072/".to_string(),
                vision_endpoint: "http://localhost:7073/".to_string(),
                key: String::new(),
                language: "en".to_string(),
                min_confidence: 0.5,
                timeout_seconds: 10,
            },
            recipes: RecipesConfig {
                endpoint: "http://localhost:7074/generate".to_string(),
                key: None,
                timeout_seconds: 60,
                max_recipes: 3,
            },
            engine: EngineConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "recipebuddy.log".to_string(),
                json: false,
            },
        }
    }
}
