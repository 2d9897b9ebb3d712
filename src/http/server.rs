//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with public and admin handlers
//! - Wire up middleware (tracing, limits, request ID, timeouts, headers)
//! - Bind server to listener (plain TCP or rustls)
//! - Apply hot-reloaded configuration while serving
//! - Stop on the shutdown broadcast

use arc_swap::ArcSwap;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::EngineConfig;
use crate::engine::ConfigEngine;
use crate::error::EngineError;
use crate::http::public::setup_public_router;

/// How long in-flight TLS connections get to finish after shutdown.
const TLS_DRAIN: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: ConfigEngine,
    pub config: Arc<ArcSwap<EngineConfig>>,
}

impl AppState {
    pub fn new(engine: ConfigEngine, config: EngineConfig) -> Self {
        Self {
            engine,
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Swap in a validated configuration.
    pub fn apply_config(&self, new_config: EngineConfig) {
        let current = self.config.load();
        if current.listener != new_config.listener || current.storage != new_config.storage {
            tracing::warn!("Listener and storage changes take effect after a restart");
        }
        if current.timeouts != new_config.timeouts || current.security != new_config.security {
            tracing::warn!("Timeout and body limit changes take effect after a restart");
        }
        self.engine.reload(&new_config);
        self.config.store(Arc::new(new_config));
        tracing::info!("Configuration reloaded");
    }
}

/// Give the body limit's early 413 (declared Content-Length too large) the
/// same JSON error shape as every other failure.
async fn json_limit_rejection(State(limit): State<usize>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json {
        return response;
    }
    EngineError::PayloadTooLarge(format!("request body exceeds the {limit} byte limit")).into_response()
}

/// HTTP server for the config engine.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: EngineConfig, engine: ConfigEngine) -> Self {
        let state = AppState::new(engine, config.clone());
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &EngineConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .merge(setup_public_router())
            .merge(setup_admin_router(state.clone()))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn_with_state(
                config.security.max_body_size,
                json_limit_rejection,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.security.enable_headers {
            router = router.layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<EngineConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reload = spawn_reload_loop(self.state.clone(), config_updates);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<EngineConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let reload = spawn_reload_loop(self.state.clone(), config_updates);
        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(TLS_DRAIN));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        reload.abort();
        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

fn spawn_reload_loop(
    state: AppState,
    mut config_updates: mpsc::UnboundedReceiver<EngineConfig>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(new_config) = config_updates.recv().await {
            state.apply_config(new_config);
        }
    })
}
