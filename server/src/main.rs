//! ProofPass HTTP server.

use anyhow::Context as _;
use proofpass_auth::providers::{HttpCredentialIssuer, KeccakContextRegistry};
use proofpass_auth::stores::{PostgresDatabase, RedisOtcStore};
use proofpass_auth::{Collaborators, ProofPass};
use proofpass_core::environment::SystemClock;
use proofpass_server::{Config, LoginNotifier, ProductionBackend, build_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proofpass=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ProofPass server");

    // Load configuration
    let config = Config::from_env().context("invalid configuration")?;
    info!(
        redis_url = %config.redis_url,
        issuer_url = %config.issuer.url,
        chain_id = %config.issuer.chain_id,
        "Configuration loaded"
    );

    // Relational store
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    let db = PostgresDatabase::new(pool);
    db.migrate().await.context("failed to run migrations")?;
    info!("Database ready");

    // One-time code cache
    let otc_store = RedisOtcStore::new(&config.redis_url)
        .await
        .context("failed to connect to Redis")?;
    info!("Redis connected");

    let notifier = LoginNotifier::from_config(config.smtp.as_ref());
    if matches!(notifier, LoginNotifier::Console(_)) {
        warn!("Login email disabled, verification codes are only logged");
    }
    info!(channel = notifier.channel(), "Code delivery configured");

    let collaborators = Collaborators::<ProductionBackend> {
        otc_store,
        notifier,
        db,
        registry: KeccakContextRegistry,
        issuer: HttpCredentialIssuer::new(&config.issuer.url),
        clock: Arc::new(SystemClock),
    };
    let proofpass = Arc::new(
        ProofPass::new(collaborators, config.settings()).context("failed to build services")?,
    );

    let app = build_router(proofpass);

    let addr = config.bind_address();
    info!(address = %addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    // Run server with graceful shutdown; in-flight requests get SHUTDOWN_TIMEOUT to drain
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let (stopping_tx, stopping_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stopping_tx.send(());
        })
        .into_future();

    let drain_deadline = async move {
        if stopping_rx.await.is_ok() {
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result.context("server error")?,
        () = drain_deadline => warn!("Shutdown timeout elapsed with requests in flight"),
    }

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
