use std::sync::Arc;

use emergency_dispatch::config::{AppConfig, StoreBackend};
use emergency_dispatch::db::{self, InterventionStore, MemoryStore, PgStore};
use emergency_dispatch::dispatch::DispatchService;
use emergency_dispatch::rpc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Emergency Dispatch Service...");

    // Init store
    let store: Arc<dyn InterventionStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
            let store = PgStore::new(pool);
            store.ensure_schema().await?;
            info!("Connected to database");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store, interventions are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed_demo_data {
        db::seed::seed_demo_data(store.as_ref()).await;
    }

    let service = DispatchService::new(store, config.tracking_params());
    let app = rpc::router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Dispatch RPC server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
