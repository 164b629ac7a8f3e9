//! Bot handlers module
//!
//! Telegram transport adapter: converts incoming messages into engine turns
//! and delivers the engine's outbound messages back to the chat.
//! - Command handlers for bot commands
//! - Message handlers for text, photos and documents

pub mod commands;
pub mod messages;

// Re-export commonly used handler functions
pub use commands::{handle_command, Command};
pub use messages::{handle_message, run_turn, send_replies, turn_from_message};
