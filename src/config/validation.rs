//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{RecipeBuddyError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_storage_config(&settings.storage)?;
    validate_repository_config(&settings.repository)?;
    validate_cognitive_config(&settings.cognitive)?;
    validate_recipes_config(&settings.recipes)?;
    validate_engine_config(&settings.engine)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(RecipeBuddyError::Config("Bot token is required".to_string()));
    }

    Ok(())
}

/// Validate state storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.backend == super::StorageBackend::Redis && config.redis_url.is_empty() {
        return Err(RecipeBuddyError::Config(
            "Redis URL is required for the redis storage backend".to_string(),
        ));
    }

    if config.ttl_seconds == Some(0) {
        return Err(RecipeBuddyError::Config(
            "State TTL must be greater than 0 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validate repository configuration
fn validate_repository_config(config: &super::RepositoryConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(RecipeBuddyError::Config(
            "Repository base URL is required".to_string(),
        ));
    }

    url::Url::parse(&config.base_url)?;

    if config.timeout_seconds == 0 {
        return Err(RecipeBuddyError::Config(
            "Repository timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate text analytics and vision configuration
fn validate_cognitive_config(config: &super::CognitiveConfig) -> Result<()> {
    if config.text_analytics_endpoint.is_empty() || config.vision_endpoint.is_empty() {
        return Err(RecipeBuddyError::Config(
            "Text analytics and vision endpoints are required".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.min_confidence) {
        return Err(RecipeBuddyError::Config(format!(
            "Minimum confidence must be within [0, 1], got {}",
            config.min_confidence
        )));
    }

    if config.timeout_seconds == 0 {
        return Err(RecipeBuddyError::Config(
            "Cognitive services timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate recipe generation configuration
fn validate_recipes_config(config: &super::RecipesConfig) -> Result<()> {
    if config.endpoint.is_empty() {
        return Err(RecipeBuddyError::Config(
            "Recipe generation endpoint is required".to_string(),
        ));
    }

    if config.max_recipes == 0 {
        return Err(RecipeBuddyError::Config(
            "At least one recipe must be requested".to_string(),
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(RecipeBuddyError::Config(
            "Recipe generation timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate dialog engine configuration
fn validate_engine_config(config: &super::EngineConfig) -> Result<()> {
    if config.max_steps_per_turn == 0 {
        return Err(RecipeBuddyError::Config(
            "Max steps per turn must be greater than 0".to_string(),
        ));
    }

    if config.image_content_types.is_empty() {
        return Err(RecipeBuddyError::Config(
            "At least one image content type must be accepted".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(RecipeBuddyError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(RecipeBuddyError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
