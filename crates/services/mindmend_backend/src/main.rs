// File: services/mindmend_backend/src/main.rs
use mindmend_backend::{build_router, create_store};
use mindmend_common::{internal_error, logging, MindmendError};
use mindmend_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        error!("MindMend backend stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), MindmendError> {
    let config = Arc::new(
        load_config().map_err(|e| MindmendError::ConfigError(e.to_string()))?,
    );

    let store = create_store(&config).await?;
    let app = build_router(config.clone(), store)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| internal_error(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(internal_error)
}
