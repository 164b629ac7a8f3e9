//! RecipeBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::utils::command::BotCommands;
use teloxide::{prelude::*, types::Update};
use tracing::{error, info, warn};

use RecipeBuddy::{
    config::Settings,
    handlers::{self, Command},
    services::Services,
    state::{DialogEngine, DialogRegistry, StateStorage},
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file appender on exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", RecipeBuddy::info());

    info!(backend = ?settings.storage.backend, "Connecting to state storage...");
    let storage = StateStorage::from_config(&settings.storage).await?;

    info!("Initializing services...");
    let services = Services::from_settings(&settings)?;

    let engine = DialogEngine::new(
        storage,
        DialogRegistry::new(),
        services,
        settings.engine.clone(),
    )?;
    let engine = Arc::new(engine);

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let mut dispatcher = Dispatcher::builder(bot.clone(), create_handler())
        .dependencies(dptree::deps![engine])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    if let Some(webhook_url) = &settings.bot.webhook_url {
        info!("Webhook URL configured: {}", webhook_url);
        info!("Note: Webhook setup not implemented in this version, falling back to polling");
    }

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    info!("RecipeBuddy bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry().branch(
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_commands),
            )
            .branch(dptree::endpoint(handle_messages)),
    )
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Arc<DialogEngine>,
) -> HandlerResult {
    if let Err(e) = handlers::handle_command(bot, msg, cmd, engine).await {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }
    Ok(())
}

/// Handle regular messages
async fn handle_messages(bot: Bot, msg: Message, engine: Arc<DialogEngine>) -> HandlerResult {
    if let Err(e) = handlers::handle_message(bot, msg, engine).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }
    Ok(())
}
