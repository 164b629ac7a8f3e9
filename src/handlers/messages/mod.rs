//! Message handlers module
//!
//! Converts Telegram messages into engine turns and sends the replies.

use std::sync::Arc;
use teloxide::{
    net::Download,
    prelude::*,
    types::{ChatId, KeyboardButton, KeyboardMarkup, Message},
    Bot,
};
use tracing::{debug, error};

use crate::models::{Attachment, OutboundMessage, Turn};
use crate::state::DialogEngine;
use crate::utils::errors::{RecipeBuddyError, Result};

const PHOTO_CONTENT_TYPE: &str = "image/jpeg";
const APOLOGY: &str = "Sorry, something went wrong on my side. Please try again in a moment.";

/// Handle incoming messages (text, photos, documents)
pub async fn handle_message(bot: Bot, msg: Message, engine: Arc<DialogEngine>) -> Result<()> {
    let turn = turn_from_message(&bot, &msg).await?;
    run_turn(&bot, msg.chat.id, &engine, turn).await
}

/// Run a turn through the engine and deliver the outcome to the chat
pub async fn run_turn(bot: &Bot, chat_id: ChatId, engine: &DialogEngine, turn: Turn) -> Result<()> {
    match engine.process_turn(&turn).await {
        Ok(replies) => send_replies(bot, chat_id, &replies).await,
        Err(e) => {
            error!(
                conversation_id = %turn.conversation_id,
                error = %e,
                "Engine failed to process turn"
            );
            bot.send_message(chat_id, APOLOGY).await?;
            Ok(())
        }
    }
}

/// Send outbound messages in order; suggestions become a one-time keyboard
pub async fn send_replies(bot: &Bot, chat_id: ChatId, replies: &[OutboundMessage]) -> Result<()> {
    for reply in replies {
        if reply.suggestions.is_empty() {
            bot.send_message(chat_id, &reply.text).await?;
        } else {
            bot.send_message(chat_id, &reply.text)
                .reply_markup(suggestion_keyboard(&reply.suggestions))
                .await?;
        }
    }
    Ok(())
}

fn suggestion_keyboard(suggestions: &[String]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = suggestions
        .iter()
        .map(|label| vec![KeyboardButton::new(label.clone())])
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard()
}

/// Build an engine turn from a Telegram message
pub async fn turn_from_message(bot: &Bot, msg: &Message) -> Result<Turn> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| RecipeBuddyError::InvalidInput("No user in message".to_string()))?;

    let mut attachments = Vec::new();

    // Telegram sends several sizes of a photo; the last is the largest
    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        let content = download(bot, photo.file.id.clone()).await?;
        attachments.push(telegram_attachment(PHOTO_CONTENT_TYPE, &photo.file.id, content));
    }

    if let Some(document) = msg.document() {
        let content_type = document
            .mime_type
            .as_ref()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content = download(bot, document.file.id.clone()).await?;
        attachments.push(telegram_attachment(content_type, &document.file.id, content));
    }

    let text = msg.text().or_else(|| msg.caption()).map(str::to_string);

    debug!(
        chat_id = %msg.chat.id,
        has_text = text.is_some(),
        attachments = attachments.len(),
        "Converted message to turn"
    );

    Ok(Turn {
        conversation_id: msg.chat.id.0.to_string(),
        user_id: user.id.0.to_string(),
        user_name: Some(user.first_name.clone()),
        text,
        attachments,
    })
}

/// Fetch the content of a Telegram file
async fn download(bot: &Bot, file_id: String) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let mut content = Vec::new();
    bot.download_file(&file.path, &mut content).await?;
    Ok(content)
}

/// Attachment for downloaded Telegram content, referenced by file id only
fn telegram_attachment(content_type: impl Into<String>, file_id: &str, content: Vec<u8>) -> Attachment {
    Attachment::new(content_type, format!("telegram:{}", file_id)).with_data(content)
}
