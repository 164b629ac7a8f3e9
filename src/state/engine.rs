//! Dialog orchestration engine
//!
//! Processes one turn at a time per conversation: loads the stack and
//! state bags, resumes the suspended instance (or starts the root dialog),
//! applies step transitions until the conversation suspends on a prompt or
//! goes idle, then persists everything and returns the outbound messages.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, Instrument};

use super::context::{DialogValues, TurnContext};
use super::prompt;
use super::stack::{DialogInstance, DialogStack};
use super::storage::StateStorage;
use super::waterfall::{self, DialogRegistry, StepInput, Transition};
use crate::config::EngineConfig;
use crate::models::{OutboundMessage, Turn};
use crate::services::Services;
use crate::utils::errors::{RecipeBuddyError, Result};
use crate::utils::helpers::generate_uuid;
use crate::utils::logging::{
    log_recognition_failure, log_transition, log_turn_failed, log_turn_started,
};

/// Turn-resumable, stack-based dialog engine
pub struct DialogEngine {
    storage: StateStorage,
    registry: Arc<DialogRegistry>,
    services: Services,
    config: Arc<EngineConfig>,
    conversation_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DialogEngine {
    pub fn new(
        storage: StateStorage,
        registry: DialogRegistry,
        services: Services,
        config: EngineConfig,
    ) -> Result<Self> {
        registry.ensure_registered(config.root_dialog)?;

        Ok(Self {
            storage,
            registry: Arc::new(registry),
            services,
            config: Arc::new(config),
            conversation_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn storage(&self) -> &StateStorage {
        &self.storage
    }

    /// Process one inbound turn to completion
    pub async fn process_turn(&self, turn: &Turn) -> Result<Vec<OutboundMessage>> {
        let turn_id = generate_uuid();
        let span = info_span!(
            "turn",
            turn_id = %turn_id,
            conversation_id = %turn.conversation_id,
            user_id = %turn.user_id,
        );

        async {
            let lock = self.conversation_lock(&turn.conversation_id).await;
            let result = {
                let _guard = lock.lock().await;
                self.process_locked(turn).await
            };
            drop(lock);
            self.release_conversation_lock(&turn.conversation_id).await;

            if let Err(e) = &result {
                log_turn_failed(&turn.conversation_id, e);
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Return the conversation to idle, discarding any in-flight dialogs
    pub async fn reset_conversation(&self, conversation_id: &str) -> Result<()> {
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.storage.clear_conversation(conversation_id).await
        };
        drop(lock);
        self.release_conversation_lock(conversation_id).await;

        info!(conversation_id = %conversation_id, "Conversation reset");
        result
    }

    async fn process_locked(&self, turn: &Turn) -> Result<Vec<OutboundMessage>> {
        let mut stack = self.storage.load_stack(&turn.conversation_id).await?;
        let conversation = self.storage.load_conversation(&turn.conversation_id).await;
        let user = self.storage.load_user(&turn.user_id).await;

        log_turn_started(
            &turn.conversation_id,
            &turn.user_id,
            turn.kind().as_str(),
            stack.depth(),
        );

        let mut ctx = TurnContext::new(
            turn.conversation_id.clone(),
            turn.user_id.clone(),
            turn.user_name.clone(),
            conversation,
            user,
            self.services.clone(),
            self.config.clone(),
        );
        ctx.conversation.touch();

        if let Some(input) = self.resolve_input(&mut stack, &mut ctx, turn)? {
            self.drive(&mut stack, &mut ctx, input).await?;
        }

        // Bags first: a failed write must not leave the stack ahead of them
        self.storage
            .save_conversation(&turn.conversation_id, &ctx.conversation)
            .await?;
        self.storage.save_user(&turn.user_id, &ctx.user).await?;
        self.storage.save_stack(&turn.conversation_id, &stack).await?;

        debug!(
            stack = ?stack.path(),
            suspended = !stack.is_idle(),
            "Turn complete"
        );
        Ok(ctx.take_outbound())
    }

    /// Decide what runs first this turn. `None` means the turn was answered
    /// by re-prompting and nothing should run.
    fn resolve_input(
        &self,
        stack: &mut DialogStack,
        ctx: &mut TurnContext,
        turn: &Turn,
    ) -> Result<Option<StepInput>> {
        if stack.is_idle() {
            let root = self.config.root_dialog;
            debug!(dialog = %root, "Idle conversation, starting root dialog");
            stack.push(DialogInstance::new(root, DialogValues::new()));
            return Ok(Some(StepInput::Options(DialogValues::new())));
        }

        let conversation_id = turn.conversation_id.clone();
        let top = stack
            .top_mut()
            .ok_or_else(|| RecipeBuddyError::CorruptStackState {
                conversation_id: conversation_id.clone(),
                reason: "stack has no active instance".to_string(),
            })?;

        let spec = top
            .pending_prompt
            .clone()
            .ok_or_else(|| RecipeBuddyError::CorruptStackState {
                conversation_id,
                reason: format!(
                    "active dialog {} at step {} is not awaiting input",
                    top.dialog_id, top.step_index
                ),
            })?;

        match prompt::recognize(&spec, turn) {
            Some(value) => {
                top.pending_prompt = None;
                top.step_index += 1;
                Ok(Some(StepInput::Recognized(value)))
            }
            None => {
                log_recognition_failure(top.dialog_id, top.step_index, spec.kind.as_str());
                ctx.send_all(prompt::reissue(&spec));
                Ok(None)
            }
        }
    }

    /// Apply transitions until the top instance suspends or the stack empties
    async fn drive(
        &self,
        stack: &mut DialogStack,
        ctx: &mut TurnContext,
        mut input: StepInput,
    ) -> Result<()> {
        let limit = self.config.max_steps_per_turn;

        for _ in 0..limit {
            let instance = stack
                .top_mut()
                .ok_or_else(|| RecipeBuddyError::CorruptStackState {
                    conversation_id: ctx.conversation_id.clone(),
                    reason: "no active instance to run".to_string(),
                })?;
            let dialog = instance.dialog_id;
            let step_index = instance.step_index;

            let transition = waterfall::run_step(&self.registry, instance, ctx, input).await?;
            log_transition(dialog, step_index, transition.name(), stack.depth());

            input = match self.apply(stack, ctx, transition)? {
                Some(next) => next,
                None => return Ok(()),
            };
        }

        Err(RecipeBuddyError::StepLimitExceeded { limit })
    }

    /// Apply one transition to the stack, returning the input for the next
    /// step to run immediately, if any
    fn apply(
        &self,
        stack: &mut DialogStack,
        ctx: &mut TurnContext,
        transition: Transition,
    ) -> Result<Option<StepInput>> {
        match transition {
            Transition::Prompt(spec) => {
                ctx.send_all(prompt::issue(&spec));
                if let Some(top) = stack.top_mut() {
                    top.pending_prompt = Some(spec);
                }
                Ok(None)
            }
            Transition::Continue(value) => {
                if let Some(top) = stack.top_mut() {
                    top.step_index += 1;
                }
                Ok(Some(StepInput::Value(value)))
            }
            Transition::BeginDialog(dialog_id, options) => {
                self.registry.ensure_registered(dialog_id)?;
                stack.push(DialogInstance::new(dialog_id, options.clone()));
                Ok(Some(StepInput::Options(options)))
            }
            Transition::ReplaceDialog(dialog_id, options) => {
                self.registry.ensure_registered(dialog_id)?;
                stack.replace_top(DialogInstance::new(dialog_id, options.clone()));
                Ok(Some(StepInput::Options(options)))
            }
            Transition::EndDialog(result) => {
                stack.pop();
                match stack.top_mut() {
                    Some(parent) => {
                        parent.step_index += 1;
                        Ok(Some(StepInput::Value(result)))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    async fn conversation_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.conversation_locks.lock().await;
        locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock once no other turn holds or waits on it
    async fn release_conversation_lock(&self, conversation_id: &str) {
        let mut locks = self.conversation_locks.lock().await;
        if locks
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(conversation_id);
        }
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.conversation_locks.lock().await.len()
    }
}

impl std::fmt::Debug for DialogEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
