use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirror_sync_core::{
    load_config, validate_config, HttpRegistryClient, PackageStore, PackageSyncWorker,
    RegistryClient, RegistryPackageSyncer, SqlitePackageStore, SqliteWatermarkStore, StatusBoard,
    StatusReporter, SyncOrchestrator, SyncPlanner, WatermarkStore, WorkerDriver,
};
use mirror_sync_server::api::create_router;
use mirror_sync_server::scheduler::SyncScheduler;
use mirror_sync_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MIRROR_SYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Upstream registry: {}", config.registry.url);
    info!("Database path: {:?}", config.database.path);

    // Create SQLite stores
    let watermark_store: Arc<dyn WatermarkStore> = Arc::new(
        SqliteWatermarkStore::new(&config.database.path)
            .context("Failed to create watermark store")?,
    );
    info!("Watermark store initialized");

    let package_store: Arc<dyn PackageStore> = Arc::new(
        SqlitePackageStore::new(&config.database.path)
            .context("Failed to create package store")?,
    );
    info!("Package store initialized");

    // Create upstream registry client
    let registry: Arc<dyn RegistryClient> = Arc::new(
        HttpRegistryClient::new(&config.registry).context("Failed to create registry client")?,
    );

    // Create worker
    let syncer = RegistryPackageSyncer::new(Arc::clone(&registry), Arc::clone(&package_store));
    let worker: Arc<dyn WorkerDriver> = Arc::new(
        PackageSyncWorker::new(Arc::new(syncer)).with_checkpoints(Arc::clone(&watermark_store)),
    );

    // Create orchestrator
    let status_board = Arc::new(StatusBoard::new());
    let planner = SyncPlanner::new(config.planner.clone(), Arc::clone(&registry));
    let orchestrator = Arc::new(
        SyncOrchestrator::new(
            config.sync.clone(),
            Arc::clone(&watermark_store),
            planner,
            worker,
        )
        .with_status_reporter(Arc::clone(&status_board) as Arc<dyn StatusReporter>),
    );
    info!(
        "Sync orchestrator initialized (concurrency {}, actor {})",
        config.sync.concurrency, config.sync.actor
    );

    // Start scheduler
    let scheduler = Arc::new(SyncScheduler::new(
        config.scheduler.clone(),
        Arc::clone(&orchestrator),
    ));
    scheduler.start();

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        orchestrator,
        Arc::clone(&scheduler),
        status_board,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    scheduler.stop();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
