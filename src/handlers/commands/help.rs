//! Help command handler

use teloxide::{prelude::*, types::Message, Bot};

use crate::utils::errors::Result;

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    let help_text = "RecipeBuddy Help\n\n\
        Send me the ingredients you have on hand, as a list or as a photo, \
        and I'll suggest recipes that use them.\n\n\
        /start - Start or resume the conversation\n\
        /reset - Forget the current conversation and start over\n\
        /help - Show this help message";

    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}
