//! RecipeBuddy
//!
//! A conversational recipe assistant built on a turn-resumable, stack-based
//! dialog engine. Dialogs are waterfalls of async steps; the engine suspends
//! a conversation on a prompt, persists its dialog stack, and resumes it when
//! the next message arrives.

#![allow(non_snake_case)]

pub mod config;
pub mod dialogs;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{RecipeBuddyError, Result};

// Re-export main components for easy access
pub use services::Services;
pub use state::{DialogEngine, DialogRegistry, StateStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
