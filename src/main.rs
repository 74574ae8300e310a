use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod models;
mod routes;
mod scheduler;
mod services;
mod state;
mod utils;

use config::Config;
use db::SnapshotStore;
use state::AppContext;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("usd_tracker=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting USD tracker v{}", env!("CARGO_PKG_VERSION"));

    // Misconfiguration is the only fatal error, and only before the scheduler starts
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Initializing database...");
    let pool = match db::init_db(&config.database_url).await {
        Ok(p) => {
            info!("Database initialized successfully");
            p
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = match AppContext::new(&config, SnapshotStore::new(pool)) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    ctx.scheduler.start().await;

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            ctx.scheduler.stop().await;
            std::process::exit(1);
        }
    };
    info!("Listening on http://{}", config.bind_addr);

    let app = routes::router(Arc::clone(&ctx)).into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    ctx.scheduler.stop().await;
    ctx.store.close().await;
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping...");
}
