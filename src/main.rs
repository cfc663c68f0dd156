use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::InMemStorage, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks::{self, Options},
};
use vocabot::{
    config::Config, database::connection::Connection, logging::init_tracing, schema::schema,
    state::BotState,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "bot stopped");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), vocabot::error::BotError> {
    let connection = Arc::new(Connection::connect(&config.database_url).await?);
    connection.migrate().await?;
    tracing::info!(database = %config.database_url, "database ready");

    let bot = Bot::new(config.token);
    let languages = Arc::new(config.languages);
    tracing::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![
            InMemStorage::<BotState>::new(),
            connection,
            languages
        ])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            tracing::info!(url = %webhook.url, addr = %webhook.addr, "listening for webhook updates");
            let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            tracing::info!("polling for updates");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}
