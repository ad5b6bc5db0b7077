// src/main.rs

use std::{net::SocketAddr, sync::Arc};

use status_board::config::Config;
use status_board::routes;
use status_board::services::auth::seed_admin;
use status_board::state::AppState;
use status_board::store::{MemoryStore, PgStore, SharedStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (and .env, if present)
    let config = Config::from_env().map_err(|e| format!("JWT_SECRET must be set: {}", e))?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: SharedStore = match &config.database_url {
        Some(database_url) => {
            let store = PgStore::connect(database_url).await?;
            tracing::info!("Database connected...");

            // Run Migrations Automatically
            tracing::info!("Running migrations...");
            store.migrate().await?;
            tracing::info!("Migrations applied successfully.");

            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store. Data will not persist.");
            Arc::new(MemoryStore::new())
        }
    };

    // Seed Admin User
    if let Err(e) = seed_admin(store.as_ref(), &config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState {
        store,
        config,
    };

    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
