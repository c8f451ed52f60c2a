use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use orderbot::bot::{self, Command, TelegramGateway};
use orderbot::catalog::CatalogStore;
use orderbot::config::Config;
use orderbot::db::PgLedger;
use orderbot::ledger::{CsvLedger, OrderLedger};
use orderbot::shop::Shop;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Order Telegram Bot");

    let config = Config::from_env()?;
    info!(admins = config.admin_ids.len(), "Configuration loaded");

    let catalog = Arc::new(CatalogStore::open(&config.products_file).await?);

    let ledger: Arc<dyn OrderLedger> = match &config.database_url {
        Some(database_url) => {
            info!("Using PostgreSQL order ledger");
            Arc::new(PgLedger::connect(database_url).await?)
        }
        None => {
            let ledger = CsvLedger::new(&config.orders_file);
            info!(path = %ledger.path().display(), "Using CSV order ledger");
            Arc::new(ledger)
        }
    };

    let bot = Bot::new(&config.bot_token);
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let shop = Arc::new(Shop::new(
        catalog,
        gateway,
        ledger,
        config.admin_ids.iter().copied(),
    ));

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![shop])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
