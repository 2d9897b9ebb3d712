//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use site_config_client::ConfigClient;
use site_config_engine::config::{EngineConfig, StorageBackend};
use site_config_engine::{ConfigEngine, HttpServer, Shutdown};

pub const API_KEY: &str = "test-admin-key";

/// A running engine bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<EngineConfig>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn admin_client(&self) -> ConfigClient {
        ConfigClient::new(&self.url())
            .with_api_key(API_KEY)
            .with_actor("integration")
    }

    /// Stop the server and wait for it to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

/// Config with in-memory storage, a known admin key and metrics off.
pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.storage.backend = StorageBackend::Memory;
    config.admin.api_key = API_KEY.to_string();
    config.observability.metrics_enabled = false;
    config
}

/// Same as [`test_config`] but journaled under `dir`.
pub fn journal_config(dir: &Path) -> EngineConfig {
    let mut config = test_config();
    config.storage.backend = StorageBackend::Journal;
    config.storage.journal_path = dir.join("journal.jsonl");
    config.storage.fsync = false;
    config
}

pub async fn start_server(config: EngineConfig) -> TestServer {
    let engine = ConfigEngine::from_config(&config).expect("engine starts");
    start_server_with(config, engine).await
}

/// Serve a prebuilt engine, e.g. one over a wrapped store.
pub async fn start_server_with(config: EngineConfig, engine: ConfigEngine) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, engine);

    let handle = tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        config_tx,
        handle,
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
