//! Dialog stack
//!
//! The persisted, per-conversation ordered sequence of active dialog
//! instances. The last element is the active instance; an empty stack
//! means the conversation is idle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::DialogValues;
use super::prompt::PromptSpec;

/// Closed set of dialog definitions known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogId {
    Root,
    WelcomeNewUser,
    Allergies,
    ProvideIngredients,
    ChooseRecipe,
    Cooking,
}

impl DialogId {
    pub const ALL: [DialogId; 6] = [
        DialogId::Root,
        DialogId::WelcomeNewUser,
        DialogId::Allergies,
        DialogId::ProvideIngredients,
        DialogId::ChooseRecipe,
        DialogId::Cooking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogId::Root => "root",
            DialogId::WelcomeNewUser => "welcome_new_user",
            DialogId::Allergies => "allergies",
            DialogId::ProvideIngredients => "provide_ingredients",
            DialogId::ChooseRecipe => "choose_recipe",
            DialogId::Cooking => "cooking",
        }
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One live occurrence of a dialog definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogInstance {
    pub dialog_id: DialogId,
    /// Step that last ran for this instance
    pub step_index: usize,
    #[serde(default)]
    pub values: DialogValues,
    /// Outstanding prompt; present only while suspended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_prompt: Option<PromptSpec>,
}

impl DialogInstance {
    /// Fresh instance positioned at its first step, seeded from `options`
    pub fn new(dialog_id: DialogId, options: DialogValues) -> Self {
        Self {
            dialog_id,
            step_index: 0,
            values: options,
            pending_prompt: None,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.pending_prompt.is_some()
    }
}

/// Ordered stack of dialog instances owned by one conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogStack {
    instances: Vec<DialogInstance>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.instances.len()
    }

    pub fn top(&self) -> Option<&DialogInstance> {
        self.instances.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut DialogInstance> {
        self.instances.last_mut()
    }

    pub fn push(&mut self, instance: DialogInstance) {
        self.instances.push(instance);
    }

    pub fn pop(&mut self) -> Option<DialogInstance> {
        self.instances.pop()
    }

    /// Swap the top instance for `instance`, keeping the depth unchanged
    pub fn replace_top(&mut self, instance: DialogInstance) -> Option<DialogInstance> {
        let previous = self.instances.pop();
        self.instances.push(instance);
        previous
    }

    /// Dialog ids from bottom to top, for logging
    pub fn path(&self) -> Vec<DialogId> {
        self.instances.iter().map(|instance| instance.dialog_id).collect()
    }
}
