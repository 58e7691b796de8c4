use anyhow::Result;
use std::sync::Arc;

use trakt_gateway::auth::TokenManager;
use trakt_gateway::config::{Config, SecretBackend};
use trakt_gateway::routes;
use trakt_gateway::secrets::{FileStore, GoogleSecretStore, SecretStore};
use trakt_gateway::sync::SyncService;
use trakt_gateway::trakt::TraktClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging with the configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::info!("Trakt Gateway starting...");
    tracing::info!(
        "Server configured: {}:{}",
        config.server_host,
        config.server_port
    );
    tracing::info!(
        "Trakt account: {} ({})",
        config.trakt_user,
        config.trakt_api_base_url
    );

    // Secret store backend
    let store = build_secret_store(&config)?;

    // Token manager over the secret store
    let token_manager = Arc::new(TokenManager::new(
        store,
        config.secret_name.clone(),
        config.trakt_api_base_url.clone(),
        config.token_refresh_buffer,
    )?);

    // Probe the credentials once so a broken secret shows up at startup
    match token_manager.auth_headers().await {
        Ok(_) => tracing::info!("Credential blob loaded, auth headers available"),
        Err(e) => {
            tracing::error!("Failed to build auth headers: {}", e);
            tracing::warn!("Server will start but Trakt requests will fail until the secret is fixed");
        }
    }

    // Trakt client with the rate-limit retry policy
    let trakt_client = Arc::new(TraktClient::new(
        token_manager,
        config.trakt_api_base_url.clone(),
        config.http_connect_timeout,
        config.http_request_timeout,
    )?);

    let sync = Arc::new(SyncService::new(
        trakt_client.clone(),
        config.trakt_user.clone(),
    ));

    let state = routes::AppState {
        sync,
        trakt: trakt_client,
    };

    let app = routes::build_router(state);

    // Bind to configured host and port
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Select the secret store backend from configuration
fn build_secret_store(config: &Config) -> Result<Arc<dyn SecretStore>> {
    use anyhow::Context;

    match config.secret_backend {
        SecretBackend::Gcp => {
            let project = config
                .gcp_project
                .clone()
                .context("GCP_PROJECT is required when SECRET_BACKEND=gcp")?;
            tracing::info!("Using Google Secret Manager (project {})", project);
            Ok(Arc::new(GoogleSecretStore::new(project)))
        }
        SecretBackend::File => {
            let dir = config
                .secrets_dir
                .clone()
                .context("SECRETS_DIR is required when SECRET_BACKEND=file")?;
            tracing::info!("Using file secret store at {}", dir.display());
            Ok(Arc::new(FileStore::new(dir)))
        }
    }
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
