use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod models;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;
use db::Database;
use services::{
    AssetRegistry, EthersWallet, ParserClient, SubmissionDriver, TransferPipeline, WalletProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptoface_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting CryptoFace Backend Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    // Initialize database
    let db = Database::new(&config).await?;

    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    // A bad token table should stop the boot, not surface per request
    let registry = AssetRegistry::from_config(&config)?;

    // Wallet capability is acquired once at startup; without a signing key
    // the pipeline still parses but refuses submissions.
    let wallet: Option<Arc<dyn WalletProvider>> = match EthersWallet::from_config(&config)? {
        Some(wallet) => Some(Arc::new(wallet)),
        None => {
            tracing::warn!("No wallet private key configured; submissions will be rejected");
            None
        }
    };

    let parser = ParserClient::from_config(&config)?;
    let pipeline = Arc::new(TransferPipeline::new(
        parser,
        registry,
        SubmissionDriver::new(wallet),
    ));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.parser_timeout_secs))
        .build()?;

    let app_state = api::AppState {
        db,
        config: config.clone(),
        http,
        pipeline,
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Chat message store
        .route(
            "/api/messages",
            get(api::messages::list_messages).post(api::messages::create_message),
        )
        // Natural-language parse proxy
        .route("/api/parseTransaction", post(api::parse::parse_transaction))
        // Prompt-to-transaction pipeline
        .route("/api/v1/transfer/parse", post(api::transfer::parse_prompt))
        .route("/api/v1/transfer/sign", post(api::transfer::sign_transfer))
        .route(
            "/api/v1/transfer/state/{address}",
            get(api::transfer::get_state),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
