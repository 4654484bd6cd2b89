//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, service construction, and the Axum server
//! lifecycle including graceful shutdown.

use crate::application::services::audit_service::DEFAULT_AUDIT_QUEUE_CAPACITY;
use crate::application::services::{AuditService, UrlService};
use crate::config::{Config, StorageConfig};
use crate::domain::audit_worker::AuditWriter;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::audit::{FileAuditWriter, RemoteAuditWriter};
use crate::infrastructure::persistence::{FileUrlRepository, MemoryUrlRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::user_cookie::UserCookieSigner;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

/// Opens the repository selected by `storage`.
///
/// PostgreSQL migrations are applied before the repository is returned.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// storage file cannot be read.
pub async fn build_repository(
    storage: &StorageConfig,
    db_max_connections: u32,
) -> Result<Arc<dyn UrlRepository>> {
    match storage {
        StorageConfig::Postgres { dsn } => {
            let pool = PgPoolOptions::new()
                .max_connections(db_max_connections)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            let repository = PgUrlRepository::new(Arc::new(pool));
            repository
                .migrate()
                .await
                .context("Failed to apply migrations")?;

            Ok(Arc::new(repository))
        }
        StorageConfig::File { path } => {
            let repository = FileUrlRepository::open(path.clone())
                .await
                .with_context(|| format!("Failed to open storage file {}", path.display()))?;

            Ok(Arc::new(repository))
        }
        StorageConfig::Memory => {
            tracing::info!("Using in-memory storage, records are lost on restart");
            Ok(Arc::new(MemoryUrlRepository::new()))
        }
    }
}

/// Builds the audit service with a sink for each configured destination.
///
/// With neither `AUDIT_FILE` nor `AUDIT_URL` set the service is disabled.
///
/// # Errors
///
/// Returns an error if the remote sink's HTTP client cannot be built.
pub fn build_audit_service(config: &Config) -> Result<AuditService> {
    let mut writers: Vec<Arc<dyn AuditWriter>> = Vec::new();

    if let Some(path) = &config.audit_file {
        writers.push(Arc::new(FileAuditWriter::new(path.clone())));
    }
    if let Some(url) = &config.audit_url {
        writers.push(Arc::new(RemoteAuditWriter::new(url.clone())?));
    }

    Ok(AuditService::new(writers, DEFAULT_AUDIT_QUEUE_CAPACITY))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL, JSON file, or memory)
/// - URL service and its background delete worker
/// - Audit sinks, if configured
/// - Axum HTTP server
///
/// On Ctrl+C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests, and then flushes every queued deletion and audit
/// event before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Storage initialization fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config.storage, config.db_max_connections).await?;

    let url_service = Arc::new(UrlService::new(repository, config.url_service_config()));

    let audit = Arc::new(build_audit_service(&config)?);

    let state = AppState::new(
        url_service.clone(),
        config.base_url.clone(),
        UserCookieSigner::new(config.cookie_signing_secret.clone()),
    )
    .with_audit(audit.clone());

    let app = app_router(state);

    let addr: SocketAddr = config
        .server_address
        .parse()
        .with_context(|| format!("Invalid SERVER_ADDRESS '{}'", config.server_address))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tracing::info!("Flushing pending deletions");
    url_service.shutdown().await;
    audit.shutdown().await;
    tracing::info!("Shutdown complete");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
