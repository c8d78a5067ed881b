mod config;
mod error;
mod process_pdf;
mod router;

use anyhow::{Context, Result};
use pdf_extraction::{ExtractionService, GeminiService};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::process_pdf::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = ServerConfig::from_env()?;

    let gemini = GeminiService::new().context("failed to configure Gemini client")?;
    log::info!("Using Gemini model {}", gemini.model());

    let state = AppState {
        service: Arc::new(ExtractionService::new(Arc::new(gemini))),
        request_timeout: config.request_timeout,
    };
    let app = router::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
