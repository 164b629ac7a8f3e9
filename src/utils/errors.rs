//! Error handling for RecipeBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy. Conditions the user can
//! recover from inside a conversation (unrecognized replies, empty extraction
//! results) are never errors; they are dialog transitions.

use thiserror::Error;

use crate::state::DialogId;

/// Main error type for RecipeBuddy application
#[derive(Error, Debug)]
pub enum RecipeBuddyError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dialog {0} is not registered")]
    UnregisteredDialog(DialogId),

    #[error("Dialog {dialog} has no step {step_index}")]
    UnknownStep { dialog: DialogId, step_index: usize },

    #[error("Corrupt dialog stack for conversation {conversation_id}: {reason}")]
    CorruptStackState { conversation_id: String, reason: String },

    #[error("Turn exceeded {limit} steps without suspending")]
    StepLimitExceeded { limit: usize },

    #[error("Failed to save state record {key}: {reason}")]
    StateSave { key: String, reason: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors reported by external collaborators (extraction, vision,
/// recipe generation, user repository)
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("{service} request failed: {reason}")]
    RequestFailed { service: &'static str, reason: String },

    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    #[error("Invalid {service} response: {reason}")]
    InvalidResponse { service: &'static str, reason: String },

    #[error("{service} unavailable")]
    ServiceUnavailable { service: &'static str },
}

/// Result type alias for RecipeBuddy operations
pub type Result<T> = std::result::Result<T, RecipeBuddyError>;

/// Result type alias for capability calls
pub type CapabilityResult<T> = std::result::Result<T, CapabilityError>;

impl CapabilityError {
    /// Classify a reqwest failure for the named service
    pub fn from_reqwest(service: &'static str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CapabilityError::Timeout { service }
        } else if error.is_connect() {
            CapabilityError::ServiceUnavailable { service }
        } else if error.is_decode() {
            CapabilityError::InvalidResponse { service, reason: error.to_string() }
        } else {
            CapabilityError::RequestFailed { service, reason: error.to_string() }
        }
    }
}

impl RecipeBuddyError {
    /// Check if the error is recoverable by retrying the turn
    pub fn is_recoverable(&self) -> bool {
        match self {
            RecipeBuddyError::Telegram(_) => true,
            RecipeBuddyError::Download(_) => true,
            RecipeBuddyError::Capability(_) => true,
            RecipeBuddyError::Config(_) => false,
            RecipeBuddyError::UnregisteredDialog(_) => false,
            RecipeBuddyError::UnknownStep { .. } => false,
            RecipeBuddyError::CorruptStackState { .. } => false,
            RecipeBuddyError::StepLimitExceeded { .. } => false,
            RecipeBuddyError::StateSave { .. } => true,
            RecipeBuddyError::Redis(_) => true,
            RecipeBuddyError::Http(_) => true,
            RecipeBuddyError::Serialization(_) => false,
            RecipeBuddyError::Io(_) => true,
            RecipeBuddyError::UrlParse(_) => false,
            RecipeBuddyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RecipeBuddyError::Config(_) => ErrorSeverity::Critical,
            RecipeBuddyError::UnregisteredDialog(_) => ErrorSeverity::Critical,
            RecipeBuddyError::UnknownStep { .. } => ErrorSeverity::Critical,
            RecipeBuddyError::CorruptStackState { .. } => ErrorSeverity::Critical,
            RecipeBuddyError::StepLimitExceeded { .. } => ErrorSeverity::Critical,
            RecipeBuddyError::Capability(_) => ErrorSeverity::Warning,
            RecipeBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
