mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware;
use crate::features::catalog::{
    self, CatalogDashboard, CatalogQuery, CatalogRenderer, HttpCatalogRepository,
    MutationCoordinator,
};
use crate::modules::http::{ApiClient, Session};
use crate::shared::constants::CATALOG_PAGE_PATH;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, response::Redirect, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Upstream marketplace API
    let session = Arc::new(Session::new(config.api.access_token.clone()));
    let api_client = Arc::new(
        ApiClient::new(&config.api, Arc::clone(&session))
            .map_err(|e| anyhow::anyhow!("Failed to build API client: {}", e))?,
    );
    if !api_client.session().is_authenticated() {
        tracing::warn!("No API_ACCESS_TOKEN configured; admin endpoints will reject requests");
    }
    tracing::info!("Marketplace API client initialized: {}", api_client.base_url());

    // Catalog feature
    let repository = Arc::new(HttpCatalogRepository::new(Arc::clone(&api_client)));
    let query = Arc::new(CatalogQuery::new(
        repository.clone(),
        config.dashboard.default_language,
    ));
    let coordinator = Arc::new(MutationCoordinator::new(repository, Arc::clone(&query)));
    let renderer = CatalogRenderer::new().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let dashboard = Arc::new(CatalogDashboard::new(
        query,
        coordinator,
        Arc::clone(&session),
        renderer,
        config.api.file_base_url.clone(),
    ));
    tracing::info!(
        "Catalog dashboard initialized (language: {})",
        config.dashboard.default_language
    );

    let dashboard_routes = Router::new()
        .merge(catalog::routes(dashboard))
        .route(
            "/",
            axum::routing::get(|| async { Redirect::to(CATALOG_PAGE_PATH) }),
        );

    let dashboard_routes = if let Some(credentials) = config.dashboard.credentials() {
        tracing::info!("Dashboard basic auth enabled");
        dashboard_routes.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
            credentials,
        ))))
    } else {
        tracing::info!("Dashboard basic auth disabled (no credentials configured)");
        dashboard_routes
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(dashboard_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Catalog dashboard available at http://{}{}", addr, CATALOG_PAGE_PATH);

    axum::serve(listener, app).await?;

    Ok(())
}
