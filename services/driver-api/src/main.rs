//! Ferry Driver API
//!
//! Driver records microservice. Business operations are served over gRPC;
//! HTTP carries only probes and metrics.
//!
//! ## gRPC Service
//!
//! Implements `DriverService` from ferry-proto on port 50053.
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod grpc;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use ferry_db::pg::Repositories;
use ferry_proto::driver_service::driver_service_server::DriverServiceServer;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tonic::transport::Server as TonicServer;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::grpc::GrpcDriverService;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("driver_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ferry Driver API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        grpc_port = config.grpc_port,
        max_connections = config.pool.max_connections,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = ferry_db::create_pool_with_options(&config.database_url, &config.pool).await?;
    tracing::info!("Database pool created");

    // Create repositories
    let repos = Repositories::new(pool.clone());
    if config.init_schema {
        repos.drivers.init_schema().await?;
        tracing::info!("Database schema initialized");
    }

    // Create application state
    let state = AppState::new(repos, config.clone());

    // Build HTTP router
    let app = build_router(state.clone(), metrics_handle);

    // Start servers
    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.grpc_port));

    // Run both servers concurrently
    tokio::select! {
        result = run_http_server(app, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = ?e, "HTTP server error");
            }
        }
        result = run_grpc_server(state, grpc_addr, config.request_timeout) => {
            if let Err(e) = result {
                tracing::error!(error = ?e, "gRPC server error");
            }
        }
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Health routes
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        );

    Router::new()
        .merge(health_routes)
        .merge(metrics_route)
        .layer(middleware)
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn run_grpc_server(
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
) -> anyhow::Result<()> {
    tracing::info!("gRPC server listening on {}", addr);

    let grpc_service = GrpcDriverService::new(state.drivers);
    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(ferry_proto::ferry::v1::FILE_DESCRIPTOR_SET)
        .build_v1()?;

    // A call that outlives the timeout is dropped, which aborts its query
    TonicServer::builder()
        .timeout(request_timeout)
        .add_service(reflection)
        .add_service(DriverServiceServer::new(grpc_service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Single-row lookups dominate; list calls stay under a second
    let driver_latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("grpc_request_duration_seconds".to_string()),
            driver_latency_buckets,
        )?
        .install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!("driver_heartbeats_total", "Total heartbeats recorded");
    metrics::describe_counter!(
        "driver_verifications_total",
        "Total drivers marked verified"
    );
    metrics::describe_counter!(
        "driver_storage_errors_total",
        "Total calls failed by a storage error"
    );
    metrics::describe_histogram!(
        "grpc_request_duration_seconds",
        "gRPC request latency in seconds by method"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
