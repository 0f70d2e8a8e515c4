mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_sessions::ExpiredDeletion;
use tracing::{error, info};

use snippetbox_db::Database;
use snippetbox_web::session::SqliteStore;
use snippetbox_web::{AppStateInner, router};

use crate::config::Config;

/// How often expired session rows are purged.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "snippetbox=debug,snippetbox_web=debug,snippetbox_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::parse();

    let db = match Database::open(&config.dsn) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!(dsn = %config.dsn, "failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let session_store = SqliteStore::new(db.clone());
    tokio::spawn(async move {
        if let Err(e) = session_store
            .continuously_delete_expired(SESSION_CLEANUP_INTERVAL)
            .await
        {
            error!("Session cleanup stopped: {}", e);
        }
    });

    let state = AppStateInner::new(db, config.static_dir.clone(), config.session_lifetime());
    let app = router(state);

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, "failed to bind: {}", e);
            std::process::exit(1);
        }
    };
    info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
