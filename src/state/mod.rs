//! State management module
//!
//! This module holds the dialog orchestration engine: the persisted dialog
//! stack, state bags and their storage, prompts, and waterfall execution.

pub mod context;
pub mod engine;
pub mod prompt;
pub mod stack;
pub mod storage;
pub mod waterfall;

// Re-export commonly used state components
pub use context::{ConversationState, DialogValues, TurnContext, UserState, ValueKey};
pub use engine::DialogEngine;
pub use prompt::{PromptKind, PromptSpec, RecognizedValue};
pub use stack::{DialogId, DialogInstance, DialogStack};
pub use storage::{MemoryStateStore, RedisStateStore, ScopeKey, StateStorage, StateStore};
pub use waterfall::{DialogRegistry, Step, StepInput, Transition};
