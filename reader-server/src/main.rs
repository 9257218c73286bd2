//! Reading app server.
//!
//! Reads its configuration from the environment (a `.env` file is loaded if
//! present), opens the story database, loads the word mapping table and
//! serves the HTTP API until Ctrl-C.

use reader_core::{StoryGenerator, StoryStore, WordMappings};
use reader_server::{router, AppState, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config =
        ServerConfig::from_env().inspect_err(|e| log::error!("Invalid configuration: {e}"))?;

    let store = StoryStore::connect(&config.database_url)
        .await
        .inspect_err(|e| log::error!("Failed to open {}: {e}", config.database_url))?;

    let word_mappings = WordMappings::load(&config.word_mappings_path).inspect_err(|e| {
        log::error!(
            "Failed to load word mappings from {}: {e}",
            config.word_mappings_path.display()
        )
    })?;
    if word_mappings.is_empty() {
        log::warn!(
            "No word mappings in {}; stories will have no sight-word hints",
            config.word_mappings_path.display()
        );
    } else {
        log::info!(
            "Loaded {} word mappings from {}",
            word_mappings.len(),
            config.word_mappings_path.display()
        );
    }

    let generator = StoryGenerator::new(Arc::new(config.provider()), store.clone())
        .with_config(config.generator_config());
    let state = AppState::new(generator, store.clone(), word_mappings);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!("Server is running on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutting down"),
        Err(e) => {
            log::warn!("Could not listen for Ctrl-C, running until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
}
