//! Parley API Server
//!
//! Main entry point for the Parley chat backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parley_api::{AppState, create_router};
use parley_core::upload::{
    AssetUploadClient, HttpAssetStore, ImageUploadService, IntakePolicy, StoreConfiguration,
};
use parley_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Create JWT service
    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    // Asset store credentials are read from the environment on first use
    let store_config = Arc::new(StoreConfiguration::from_env());
    match store_config.resolve_credentials() {
        Ok(credentials) => info!(
            cloud_name = credentials.cloud_name(),
            "Asset store credentials found"
        ),
        Err(missing) => warn!(
            missing = %missing,
            "Asset store credentials incomplete, image uploads will fail until they are set"
        ),
    }

    let store = HttpAssetStore::from_settings(&config.store)
        .context("Failed to build asset store HTTP client")?;
    let client = AssetUploadClient::new(store_config, Arc::new(store));
    let uploads = ImageUploadService::new(client, config.upload.folder.clone());
    info!(
        folder = uploads.folder(),
        base_url = %config.store.base_url,
        "Upload service configured"
    );

    let intake = IntakePolicy::new()
        .with_max_file_size(config.upload.max_file_size)
        .with_field_name(config.upload.field_name.clone());

    // Create application state
    let state = AppState {
        jwt_service: Arc::new(jwt_service),
        uploads: Arc::new(uploads),
        intake,
    };

    // Create router
    let app = create_router(state, &config.server.client_url);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received terminate signal"),
    }

    info!("Shutting down gracefully...");
}
