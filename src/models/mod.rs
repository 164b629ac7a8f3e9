//! Data models module
//!
//! This module contains the data structures exchanged with the transport
//! and with the external collaborators

pub mod activity;
pub mod recipe;
pub mod user;

// Re-export commonly used models
pub use activity::{Attachment, OutboundMessage, Turn, TurnKind};
pub use recipe::{render_recipe_text, Recipe};
pub use user::{AllergyRecord, Preference, PreferenceRecord, UserRecord};
