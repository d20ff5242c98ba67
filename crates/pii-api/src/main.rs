//! PII API Server
//!
//! REST API server exposing the GLiNER PII model.
//!
//! Author: hephaex@gmail.com

use pii_api::{create_router, state::AppState};
use pii_core::config::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    init_tracing(&config.logging);

    // Load the model once; failure is fatal
    tracing::info!(
        model_id = %config.model.model_id,
        model_dir = %config.model.model_dir.display(),
        "loading model"
    );
    let recognizer = pii_extractor::load_recognizer(&config.model)?;

    let addr = config.bind_addr();

    // Create application state
    let state = Arc::new(AppState::new(config, recognizer));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("GLiNER-PII API starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "pii_api={0},pii_extractor={0},tower_http={0}",
            logging.level
        )
        .into()
    });

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
