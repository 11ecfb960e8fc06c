use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seatgrab_core::{
    create_audit_system, load_config, validate_config, AuditStore, BookingOrchestrator,
    PortalGateway, ProgressBroadcaster, ReservationRunner, SamanGateway, SettingsStore,
    SqliteAuditStore, SqliteSettingsStore, TriggerScheduler,
};

use seatgrab_server::api::create_router;
use seatgrab_server::state::AppState;

/// Buffer size for the audit entry channel
const AUDIT_BUFFER_SIZE: usize = 1000;

/// Audit entries older than this many days are pruned at startup
const AUDIT_RETENTION_DAYS: i64 = 90;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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
    let config_path = std::env::var("SEATGRAB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Portal base URL: {}", config.portal.base_url);
    info!("Database path: {:?}", config.database.path);

    // Create SQLite settings store
    let settings: Arc<dyn SettingsStore> = Arc::new(
        SqliteSettingsStore::new(&config.database.path)
            .context("Failed to create settings store")?,
    );
    info!("Settings store initialized");

    // Create SQLite audit store and prune entries past retention
    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    match audit_store.prune_older_than(AUDIT_RETENTION_DAYS) {
        Ok(0) => {}
        Ok(n) => info!(
            "Pruned {} audit entries older than {} days",
            n, AUDIT_RETENTION_DAYS
        ),
        Err(e) => error!("Failed to prune audit entries: {}", e),
    }
    info!("Audit store initialized");

    // Create audit system
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);

    // Spawn audit writer task
    let writer_handle = tokio::spawn(audit_writer.run());

    // Portal gateway holding the shared cookie-backed session
    let gateway: Arc<dyn PortalGateway> = Arc::new(SamanGateway::new(config.portal.clone()));
    info!("Portal gateway initialized");

    // Progress broadcaster feeding the WS dashboard
    let progress = ProgressBroadcaster::default();

    // Booking orchestrator
    let runner: Arc<dyn ReservationRunner> = Arc::new(BookingOrchestrator::new(
        Arc::clone(&gateway),
        Arc::clone(&settings),
        Some(audit_handle.clone()),
        progress.clone(),
    ));

    // Trigger scheduler
    let scheduler = TriggerScheduler::new(
        config.scheduler.clone(),
        Arc::clone(&settings),
        Arc::clone(&runner),
    );
    scheduler.start();
    info!("Trigger scheduler started");

    // Create app state
    let state = Arc::new(AppState::new(
        settings,
        audit_store,
        audit_handle.clone(),
        runner,
        scheduler.clone(),
        progress,
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

    // Stop the scheduler before closing the audit channel
    info!("Server shutting down...");
    scheduler.stop().await;
    info!("Trigger scheduler stopped");

    // Drop all holders of AuditHandle so the writer's channel closes.
    // The scheduler's runner holds a handle clone; AppState went down with
    // the server.
    drop(scheduler);
    drop(audit_handle);

    // Wait for writer to finish processing remaining entries
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
