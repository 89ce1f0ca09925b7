//! ContestDesk - Application Entry Point
//!
//! This is the main entry point for the ContestDesk server.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contestdesk::{
    config::{Config, LogFormat, StorageBackend},
    db::{self, Repositories},
    state::AppState,
};

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.rust_log.clone().into());
    let registry = tracing_subscriber::registry().with(filter);

    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect_repositories(config: &Config) -> anyhow::Result<Repositories> {
    match config.database.backend {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(&config.database).await?;
            db::test_connection(&pool).await?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;

            Ok(Repositories::postgres(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Repositories::in_memory())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!("Starting ContestDesk server...");

    let repos = connect_repositories(&config).await?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState::new(repos, config);

    // Build the router
    let app = contestdesk::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start the server
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
