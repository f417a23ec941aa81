use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use ads_assistant::assistant::{AiClient, AssistantEngine, Command, Database, TelegramClient};
use ads_assistant::config::Config;
use ads_assistant::telegram_log::TelegramLogLayer;

type Engine = AssistantEngine<TelegramClient>;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_token);

    let _guard = match init_logging(&config, &bot) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ Failed to open log file: {e}");
            std::process::exit(1);
        }
    };

    info!("🚀 Starting ads-assistant...");
    info!("Model: {}, endpoint: {}", config.ai_model, config.ai_api_url);

    let database = match Database::open(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let username = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            warn!("Failed to get bot info: {e}");
            None
        }
    };
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register command menu: {e}");
    }

    let ai = AiClient::new(config.ai_api_key.clone(), config.ai_api_url.clone(), config.ai_model.clone());
    let mut engine = AssistantEngine::new(database, ai, TelegramClient::new(bot.clone()));
    if let Some(username) = username {
        engine = engine.with_username(username);
    }
    let engine: Arc<Engine> = Arc::new(engine);

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_logging(config: &Config, bot: &Bot) -> std::io::Result<WorkerGuard> {
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("ads-assistant.log"))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let filter = || {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(filter()),
        )
        .with(config.log_chat_id.map(|chat_id| TelegramLogLayer::new(bot.clone(), chat_id)))
        .init();

    Ok(guard)
}

async fn handle_message(msg: Message, engine: Arc<Engine>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id);
        return Ok(());
    };

    engine.handle_message(msg.chat.id.0, text).await;
    Ok(())
}
