//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the RecipeBuddy application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LoggingConfig;
use crate::state::DialogId;
use crate::utils::errors::{RecipeBuddyError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| RecipeBuddyError::Config(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log the start of a turn
pub fn log_turn_started(conversation_id: &str, user_id: &str, kind: &str, stack_depth: usize) {
    info!(
        conversation_id = conversation_id,
        user_id = user_id,
        kind = kind,
        stack_depth = stack_depth,
        "Turn started"
    );
}

/// Log a transition applied to the dialog stack
pub fn log_transition(dialog: DialogId, step_index: usize, transition: &str, stack_depth: usize) {
    debug!(
        dialog = %dialog,
        step_index = step_index,
        transition = transition,
        stack_depth = stack_depth,
        "Transition applied"
    );
}

/// Log a reply that did not match the pending prompt
pub fn log_recognition_failure(dialog: DialogId, step_index: usize, prompt_kind: &str) {
    info!(
        dialog = %dialog,
        step_index = step_index,
        prompt_kind = prompt_kind,
        "Reply not recognized, re-prompting"
    );
}

/// Log an external capability call
pub fn log_capability_call(service: &str, operation: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            service = service,
            operation = operation,
            duration_ms = duration_ms,
            "Capability call completed"
        );
    } else {
        warn!(
            service = service,
            operation = operation,
            duration_ms = duration_ms,
            "Capability call failed"
        );
    }
}

/// Log a failed turn
pub fn log_turn_failed(conversation_id: &str, error: &RecipeBuddyError) {
    error!(
        conversation_id = conversation_id,
        severity = %error.severity(),
        recoverable = error.is_recoverable(),
        error = %error,
        "Turn failed"
    );
}
