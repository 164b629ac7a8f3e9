//! Start and reset command handlers
//!
//! `/start` announces the user's presence to the engine without any text,
//! which resumes a suspended conversation or starts the root dialog.

use std::sync::Arc;
use teloxide::{prelude::*, types::Message, Bot};
use tracing::info;

use crate::handlers::messages::{run_turn, turn_from_message};
use crate::state::DialogEngine;
use crate::utils::errors::Result;

/// Handle /start command
pub async fn handle_start(bot: Bot, msg: Message, engine: Arc<DialogEngine>) -> Result<()> {
    let mut turn = turn_from_message(&bot, &msg).await?;
    turn.text = None;

    info!(conversation_id = %turn.conversation_id, "Processing /start command");
    run_turn(&bot, msg.chat.id, &engine, turn).await
}

/// Handle /reset command: drop the conversation's dialogs, then start over
pub async fn handle_reset(bot: Bot, msg: Message, engine: Arc<DialogEngine>) -> Result<()> {
    let mut turn = turn_from_message(&bot, &msg).await?;
    turn.text = None;

    engine.reset_conversation(&turn.conversation_id).await?;
    bot.send_message(msg.chat.id, "Okay, let's start over.").await?;
    run_turn(&bot, msg.chat.id, &engine, turn).await
}
