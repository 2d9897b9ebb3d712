//! Startup orchestration.
//!
//! # Order
//! config → logging → store (journal replay) → engine → config watcher →
//! metrics exporter → listener. Any failure before the listener is bound is
//! fatal; the listener starts last so traffic only arrives once the journal
//! has been replayed.

use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::{load_or_default, ConfigError};
use crate::engine::ConfigEngine;
use crate::http::HttpServer;
use crate::lifecycle::signals::wait_for_termination;
use crate::lifecycle::Shutdown;
use crate::net::tls::load_tls_config;
use crate::observability::{logging, metrics};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("storage: {0}")]
    Store(#[from] StoreError),

    #[error("invalid listener address {0:?}")]
    Address(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Start every subsystem and serve until a termination signal.
pub async fn run(config_path: &Path) -> Result<(), StartupError> {
    let config = load_or_default(config_path)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        "site-config-engine starting"
    );

    let engine = ConfigEngine::from_config(&config)?;

    // Kept alive for the lifetime of the server.
    let (_watcher, config_updates) = if config_path.exists() {
        let (watcher, updates) = ConfigWatcher::new(config_path);
        match watcher.run() {
            Ok(handle) => (Some(handle), updates),
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                (None, updates)
            }
        }
    } else {
        (None, mpsc::unbounded_channel().1)
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, engine);

    let serve = async move {
        match tls {
            Some(tls) => {
                let addr: SocketAddr = bind_address
                    .parse()
                    .map_err(|_| StartupError::Address(bind_address.clone()))?;
                let rustls =
                    load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
                server.run_tls(addr, rustls, config_updates, server_shutdown).await?;
            }
            None => {
                let listener = TcpListener::bind(&bind_address).await?;
                tracing::info!(address = %listener.local_addr()?, "Listening for connections");
                server.run(listener, config_updates, server_shutdown).await?;
            }
        }
        Ok::<(), StartupError>(())
    };
    tokio::pin!(serve);

    tokio::select! {
        res = &mut serve => res?,
        signal = wait_for_termination() => {
            match signal {
                Ok(name) => tracing::info!(signal = name, "Termination signal received"),
                Err(e) => tracing::error!(error = %e, "Signal handler failed, shutting down"),
            }
            shutdown.trigger();
            serve.await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
