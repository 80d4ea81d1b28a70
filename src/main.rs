//! fieldlog demo server
//!
//! An axum server whose requests are logged through the typed-field Logger.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────▶ SetRequestIdLayer ──▶ RequestLogLayer ──▶ PropagateRequestIdLayer ──▶ handlers
//!                                        │                                            │
//!                                        ▼                                            ▼
//!                                 BackendAdapter ◀──────── LoggerLayer ◀──────── tracing events
//!                                        │
//!                                        ▼
//!                                 Backend (console / json) ──▶ stdout
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldlog::config::{load_config, validate_config, AppConfig, ConfigError};
use fieldlog::{BackendAdapter, Field, Logger, LoggerLayer, RequestLogLayer};

#[derive(Parser)]
#[command(name = "fieldlog-demo")]
#[command(about = "HTTP server demonstrating typed-field request logging", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (console, json); overrides the config file
    #[arg(short, long)]
    format: Option<String>,

    /// Minimum level (debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    level: Option<String>,

    /// Bind address; overrides the config file
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(format) = self.format {
            config.logging.format = format;
        }
        if let Some(level) = self.level {
            config.logging.level = level;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    let logger: Arc<dyn Logger> = Arc::new(BackendAdapter::from_logging_config(&config.logging)?);

    // Library diagnostics go through the same logger
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldlog=debug,fieldlog_demo=debug,tower_http=debug".into()),
        )
        .with(LoggerLayer::new(logger.clone()))
        .init();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr: SocketAddr = listener.local_addr()?;

    logger.info(
        "listening for connections",
        vec![
            Field::string("address", local_addr.to_string()),
            Field::string("format", config.logging.format.clone()),
            Field::string("level", config.logging.level.clone()),
        ],
    );

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/echo/{name}", get(echo))
        .route("/fail", get(fail))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(RequestLogLayer::new(logger.clone()))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(logger.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    logger.info("shutdown complete", Vec::new());
    logger.flush();
    Ok(())
}

async fn root() -> &'static str {
    "fieldlog demo\n"
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn echo(State(logger): State<Arc<dyn Logger>>, Path(name): Path<String>) -> String {
    logger.debug(
        "echo",
        vec![
            Field::string("name", name.clone()),
            Field::uint8("name_len", u8::try_from(name.len()).unwrap_or(u8::MAX)),
        ],
    );
    format!("hello, {name}\n")
}

async fn fail(State(logger): State<Arc<dyn Logger>>) -> impl IntoResponse {
    let err = std::io::Error::other("simulated upstream failure");
    logger.error("handler failed", vec![Field::error(err)]);
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error\n")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
