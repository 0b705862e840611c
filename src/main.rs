//! Main entry point for Headshot Studio

use headshot_studio::{
    api,
    config::Settings,
    controller::WorkflowController,
    generation::{GeminiClient, GenerationService},
    styles::StyleCatalog,
    AppState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.format == "pretty" {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }

    info!("Starting Headshot Studio");

    // Without a credential nothing works; refuse to start
    settings.validate()?;
    info!(
        "Loaded configuration: server={}:{} model={}",
        settings.server.host, settings.server.port, settings.gemini.model
    );

    let client = GeminiClient::new(&settings.gemini)?;
    info!(endpoint = %client.endpoint(), "Generation backend ready");

    let controller = Arc::new(WorkflowController::new(
        GenerationService::new(Arc::new(client)),
        StyleCatalog::builtin(),
    ));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let app_state = Arc::new(AppState {
        settings: Arc::new(settings),
        controller,
    });

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
