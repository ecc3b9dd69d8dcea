//! Main entry point for the generation dispatch gateway

use gen_dispatch_gateway::{
    api,
    broker::BrokerPool,
    config::Settings,
    dispatch::{AdmissionController, Dispatcher},
    model::registry::ModelRegistry,
    AppState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting generation dispatch gateway");
    info!(
        "Loaded configuration: server={}:{} backlog_limit={}",
        settings.server.host, settings.server.port, settings.queue.backlog_limit
    );

    // Initialize the broker connection pool
    let pool = BrokerPool::init(&settings.broker)?;

    // Build the model registry: defaults + queue handle per class
    let registry = Arc::new(ModelRegistry::new(
        pool.handle(),
        &settings.queue,
        settings.generation.default_steps,
    ));

    // Dispatch core
    let admission = AdmissionController::new(registry.clone(), settings.queue.backlog_limit);
    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), admission));

    // Create application state
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app_state = Arc::new(AppState {
        settings,
        registry,
        dispatcher,
    });

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    pool.shutdown();

    Ok(())
}
