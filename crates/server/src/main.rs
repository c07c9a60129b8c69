//! `enrolld` -- event-driven face enrollment service.
//!
//! Receives enrollment events over HTTP, generates a face embedding on a
//! fixed pool of workers, forwards an insert event to the configured sink,
//! and replies with an `enroll-response` event.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default         | Description                          |
//! |------------------------|----------|-----------------|--------------------------------------|
//! | `HOST`                 | no       | `0.0.0.0`       | Bind address                         |
//! | `PORT`                 | no       | `8080`          | Bind port                            |
//! | `K_SINK`               | no       | --              | Sink URL for insert events           |
//! | `MODEL_DIR`            | no       | `/opt/enroller` | Directory with the two model files   |
//! | `POOL_SIZE`            | no       | `4`             | Number of face workers               |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`            | HTTP request timeout                 |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enrolld_events::InsertPublisher;
use enrolld_face::SeetaProcessor;
use enrolld_pipeline::{Dispatcher, WorkerPool};
use enrolld_server::config::ServerConfig;
use enrolld_server::{receiver, state::AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enrolld=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        pool_size = config.pool_size,
        model_dir = %config.model_dir.display(),
        "Loaded server configuration"
    );

    // --- Worker pool ---
    // Each worker initializes its own face processor from the model files;
    // any initialization failure aborts startup.
    let model_dir = config.model_dir.clone();
    let pool = WorkerPool::start(config.pool_size, move |worker| {
        tracing::info!(worker, "Initializing face processor");
        SeetaProcessor::load(&model_dir)
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "Worker pool startup failed");
        std::process::exit(1);
    });

    let dispatcher = Dispatcher::new(pool.handle());

    // --- Downstream publisher ---
    let sink = config.effective_sink();
    tracing::info!(sink = %sink, "Insert events will target the sink");
    let publisher = Arc::new(InsertPublisher::new(sink));

    // --- App state ---
    let state = AppState {
        dispatcher,
        publisher,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        .merge(receiver::router())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout. Bounds the HTTP exchange only; a job already
        // handed to a worker still runs to completion.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // The router -- and with it every dispatcher handle -- is gone once the
    // server returns, so the pool can drain its queue and join.
    tracing::info!("Server stopped accepting connections, draining worker pool");
    pool.shutdown();

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
