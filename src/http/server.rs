//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single fallback handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Dispatch requests to the proxy table or static assets
//! - Apply proxy table reloads without restarting the listener
//! - Stop gracefully on the shutdown signal

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::DevServerConfig;
use crate::http::assets::StaticAssets;
use crate::http::forward::forward;
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::error_response;
use crate::observability::metrics;
use crate::routing::{ProxyTable, RouteError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ArcSwap<ProxyTable>>,
    pub assets: Option<Arc<StaticAssets>>,
    pub max_body_size: usize,
}

/// The development server.
pub struct DevServer {
    router: Router,
    config: DevServerConfig,
    table: Arc<ArcSwap<ProxyTable>>,
}

impl DevServer {
    /// Create a new server with the given configuration.
    pub fn new(config: DevServerConfig) -> Result<Self, RouteError> {
        let table = Arc::new(ArcSwap::from_pointee(ProxyTable::from_config(&config)?));

        let assets = config
            .static_dir
            .as_ref()
            .map(|dir| Arc::new(StaticAssets::new(dir, config.history_api_fallback)));

        let state = AppState {
            table: table.clone(),
            assets,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            table,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DevServerConfig, state: AppState) -> Router {
        // Trails the upstream deadline so upstream timeouts surface as 504.
        let deadline = Duration::from_secs(config.timeouts.request_secs + 1);

        Router::new()
            .fallback(dev_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(deadline))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id(request.headers()),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The live proxy table.
    pub fn proxy_table(&self) -> Arc<ArcSwap<ProxyTable>> {
        self.table.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the proxy table.
    /// The server stops when `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<DevServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.table.load().len(),
            "Dev server listening"
        );

        let table = self.table.clone();
        let current = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_reload(&table, &current, &new_config);
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }
}

/// Swap in the proxy table compiled from `new_config`.
///
/// Listener and static settings are read once at startup; changes to them
/// are reported and ignored.
pub fn apply_reload(table: &ArcSwap<ProxyTable>, current: &DevServerConfig, new_config: &DevServerConfig) {
    if new_config.bind_address() != current.bind_address() {
        tracing::warn!(
            current = %current.bind_address(),
            requested = %new_config.bind_address(),
            "Listen address changes require a restart"
        );
    }
    if new_config.static_dir != current.static_dir
        || new_config.history_api_fallback != current.history_api_fallback
    {
        tracing::warn!("Static asset settings change requires a restart");
    }

    match ProxyTable::from_config(new_config) {
        Ok(new_table) => {
            tracing::info!(routes = new_table.len(), "Proxy table reloaded");
            table.store(Arc::new(new_table));
        }
        Err(e) => {
            tracing::error!(error = %e, "Reload rejected, keeping current proxy table");
        }
    }
}

/// Main handler.
/// Proxies requests under a configured prefix, serves assets otherwise.
async fn dev_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    let client_ip: Option<IpAddr> = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    // Snapshot; a concurrent reload does not affect this request.
    let table = state.table.load_full();

    let Some(route) = table.match_path(&path) else {
        let response = match &state.assets {
            Some(assets) => {
                assets
                    .serve(request.method(), &path, request.headers())
                    .await
            }
            None => error_response(
                StatusCode::NOT_FOUND,
                format!("Cannot {} {}", request.method(), path),
            ),
        };
        metrics::record_request("static", response.status().as_u16(), start_time);
        return response;
    };

    match forward(route, request, client_ip, state.max_body_size).await {
        Ok(response) => {
            metrics::record_request(route.prefix(), response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %route.prefix(),
                error = %e,
                "Proxy error"
            );
            metrics::record_request(route.prefix(), e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}
