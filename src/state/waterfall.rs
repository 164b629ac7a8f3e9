//! Waterfall step execution
//!
//! A dialog definition is an ordered list of step functions. Each step
//! receives the turn context, its instance's value bag and a continuation
//! input, and returns exactly one [`Transition`] for the engine to apply.
//! Steps never touch the stack directly.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use super::context::{DialogValues, TurnContext};
use super::prompt::{PromptSpec, RecognizedValue};
use super::stack::{DialogId, DialogInstance};
use crate::utils::errors::{RecipeBuddyError, Result};

/// One step of a waterfall dialog
pub type Step = for<'a> fn(
    &'a mut TurnContext,
    &'a mut DialogValues,
    StepInput,
) -> BoxFuture<'a, Result<Transition>>;

/// What a step asks the engine to do next
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Suspend the instance until the next turn answers the prompt
    Prompt(PromptSpec),
    /// Run the next step of this instance with the given value
    Continue(serde_json::Value),
    /// Push a child dialog seeded with the given options
    BeginDialog(DialogId, DialogValues),
    /// Swap this instance for a fresh one at the same depth
    ReplaceDialog(DialogId, DialogValues),
    /// Pop this instance, resuming the caller with the result
    EndDialog(serde_json::Value),
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Prompt(_) => "prompt",
            Transition::Continue(_) => "continue",
            Transition::BeginDialog(..) => "begin_dialog",
            Transition::ReplaceDialog(..) => "replace_dialog",
            Transition::EndDialog(_) => "end_dialog",
        }
    }

    /// End with no result
    pub fn end() -> Self {
        Transition::EndDialog(serde_json::Value::Null)
    }

    /// Continue with no value
    pub fn next() -> Self {
        Transition::Continue(serde_json::Value::Null)
    }

    pub fn end_with<T: serde::Serialize>(value: T) -> Result<Self> {
        Ok(Transition::EndDialog(serde_json::to_value(value)?))
    }

    pub fn continue_with<T: serde::Serialize>(value: T) -> Result<Self> {
        Ok(Transition::Continue(serde_json::to_value(value)?))
    }
}

/// Continuation input handed to a step
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Options the instance was started with
    Options(DialogValues),
    /// Normalized answer to the prompt the previous step issued
    Recognized(RecognizedValue),
    /// Value forwarded by `Continue` or by a child's `EndDialog`
    Value(serde_json::Value),
}

impl StepInput {
    /// Yes/no answer, whether recognized or forwarded
    pub fn as_confirm(&self) -> Option<bool> {
        match self {
            StepInput::Recognized(RecognizedValue::Confirm(answer)) => Some(*answer),
            StepInput::Value(serde_json::Value::Bool(answer)) => Some(*answer),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StepInput::Recognized(RecognizedValue::Text(text)) => Some(text),
            StepInput::Recognized(RecognizedValue::Choice(label)) => Some(label),
            StepInput::Value(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Decode a forwarded value; `null` decodes to `None`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self {
            StepInput::Value(serde_json::Value::Null) => Ok(None),
            StepInput::Value(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            _ => Ok(None),
        }
    }

    /// Collapse into a plain JSON value
    pub fn into_value(self) -> Result<serde_json::Value> {
        let value = match self {
            StepInput::Options(values) => serde_json::to_value(values)?,
            StepInput::Recognized(RecognizedValue::Text(text)) => serde_json::Value::String(text),
            StepInput::Recognized(RecognizedValue::Choice(label)) => serde_json::Value::String(label),
            StepInput::Recognized(RecognizedValue::Confirm(answer)) => serde_json::Value::Bool(answer),
            StepInput::Recognized(RecognizedValue::Attachments(attachments)) => {
                serde_json::to_value(attachments)?
            }
            StepInput::Value(value) => value,
        };
        Ok(value)
    }
}

/// Explicit mapping from dialog id to its ordered steps
#[derive(Clone, Default)]
pub struct DialogRegistry {
    dialogs: HashMap<DialogId, Vec<Step>>,
}

impl DialogRegistry {
    /// Registry holding the built-in recipe conversation
    pub fn new() -> Self {
        let mut registry = Self::empty();
        crate::dialogs::register_all(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Register (or override) the steps of a dialog
    pub fn register(&mut self, dialog_id: DialogId, steps: Vec<Step>) -> &mut Self {
        self.dialogs.insert(dialog_id, steps);
        self
    }

    pub fn contains(&self, dialog_id: DialogId) -> bool {
        self.dialogs.contains_key(&dialog_id)
    }

    pub fn steps(&self, dialog_id: DialogId) -> Result<&[Step]> {
        self.dialogs
            .get(&dialog_id)
            .map(Vec::as_slice)
            .ok_or(RecipeBuddyError::UnregisteredDialog(dialog_id))
    }

    /// Fail unless `dialog_id` can be started
    pub fn ensure_registered(&self, dialog_id: DialogId) -> Result<()> {
        self.steps(dialog_id).map(|_| ())
    }
}

impl std::fmt::Debug for DialogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dialogs: Vec<_> = self
            .dialogs
            .iter()
            .map(|(id, steps)| (*id, steps.len()))
            .collect();
        dialogs.sort();
        f.debug_struct("DialogRegistry").field("dialogs", &dialogs).finish()
    }
}

/// Execute the step at the instance's current index. Running past the last
/// step ends the dialog with the forwarded value.
pub async fn run_step(
    registry: &DialogRegistry,
    instance: &mut DialogInstance,
    ctx: &mut TurnContext,
    input: StepInput,
) -> Result<Transition> {
    let steps = registry.steps(instance.dialog_id)?;

    match steps.get(instance.step_index) {
        Some(step) => step(ctx, &mut instance.values, input).await,
        None if instance.step_index == steps.len() => Ok(Transition::EndDialog(input.into_value()?)),
        None => Err(RecipeBuddyError::UnknownStep {
            dialog: instance.dialog_id,
            step_index: instance.step_index,
        }),
    }
}
