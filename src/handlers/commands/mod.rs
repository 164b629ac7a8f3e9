//! Command handlers module
//!
//! This module contains handlers for the bot commands /start, /reset and /help.

pub mod help;
pub mod start;

use std::sync::Arc;
use teloxide::{types::Message, utils::command::BotCommands, Bot};

use crate::state::DialogEngine;
use crate::utils::errors::Result;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "RecipeBuddy commands:")]
pub enum Command {
    #[command(description = "Start (or resume) the conversation")]
    Start,
    #[command(description = "Forget the current conversation and start over")]
    Reset,
    #[command(description = "Show help information")]
    Help,
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Arc<DialogEngine>,
) -> Result<()> {
    match cmd {
        Command::Start => start::handle_start(bot, msg, engine).await,
        Command::Reset => start::handle_reset(bot, msg, engine).await,
        Command::Help => help::handle_help(bot, msg).await,
    }
}
