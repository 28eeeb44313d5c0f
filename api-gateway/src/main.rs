//! Point ledger API server

use std::sync::Arc;

use api_gateway::config::AppConfig;
use api_gateway::{app, AppState};
use clap::Parser;
use dotenv::dotenv;
use point_service::{PointService, PointServiceConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Point ledger API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address, overrides API_ADDR
    #[clap(short, long)]
    addr: Option<String>,

    /// Set the log level
    #[clap(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[clap(long)]
    json_logs: bool,

    /// Simulated store latency in milliseconds, overrides STORE_LATENCY_MS
    #[clap(long)]
    store_latency_ms: Option<u64>,

    /// Bound on waiting for an account lock in milliseconds, overrides LOCK_TIMEOUT_MS
    #[clap(long)]
    lock_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // DEBUG=1 forces debug level regardless of --log-level
    let log_level = if std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false) {
        Level::DEBUG
    } else {
        args.log_level.parse::<Level>().unwrap_or(Level::INFO)
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy()
        .add_directive(format!("tower_http={}", log_level.as_str().to_lowercase()).parse()?);

    if args.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    debug!("Debug logging enabled");

    // Initialize services
    let mut config = AppConfig::from_env()?;
    if let Some(addr) = args.addr {
        config.addr = addr;
    }

    let mut service_config = PointServiceConfig::from_env();
    if let Some(latency) = args.store_latency_ms {
        service_config.store_latency_ms = latency;
    }
    if args.lock_timeout_ms.is_some() {
        service_config.lock_timeout_ms = args.lock_timeout_ms;
    }

    info!(
        "Starting point service with store latency: {}ms, lock timeout: {:?}, history logging: {}",
        service_config.store_latency_ms, service_config.lock_timeout_ms, service_config.history_logging
    );
    info!(
        "Charge policy: {:?}, use policy: {:?}",
        config.charge_policy, config.use_policy
    );

    let point_service = Arc::new(PointService::with_config(&service_config));
    let state = Arc::new(AppState::new(point_service, &config));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = app(state).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(log_level))
            .on_request(DefaultOnRequest::new().level(log_level))
            .on_response(DefaultOnResponse::new().level(log_level)),
    );

    // Start the server
    let addr: std::net::SocketAddr = config.addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
