use dotenvy::dotenv;
use easyshop_bot::{
    bot::{BotContext, session::InMemorySessionStore, telegram::TelegramNotifier},
    config::{self, Secrets, database},
    errors::Result,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Settings and secrets
    let app_config = Arc::new(config::load_app_configuration()?);
    let secrets = Secrets::from_env()
        .inspect_err(|e| error!("Failed to read secrets from the environment: {}", e))?;
    info!(?secrets, "Successfully processed application configuration.");

    // 4. Database
    let db = database::create_connection(&secrets.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Bot
    let notifier = TelegramNotifier::new(
        &secrets.telegram_bot_token,
        app_config.notifications.clone(),
    )?;
    let bot = BotContext::new(
        db,
        Arc::new(InMemorySessionStore::new()),
        Arc::new(notifier),
        Arc::clone(&app_config),
    );

    // 6. Serve the webhook and admin API
    let state = AppState::new(
        Arc::new(bot),
        &secrets.admin_api_password,
        app_config.server.event_timeout(),
    );
    server::serve(&app_config.server.bind_address, state)
        .await
        .inspect_err(|e| error!("Server stopped: {}", e))
}
