use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analytics;
mod config;
mod error;
mod handlers;
mod limiter;
mod service;
mod store;
mod token;

use analytics::AnalyticsSink;
use limiter::TokenBucketLimiter;
use service::Shortener;
use store::SqliteStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub service: Shortener,
    pub config: config::AppConfig,
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hashly=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting hashly on {}:{}", config.host, config.port);
    tracing::info!(
        "Slice length {} (token length {})",
        config.slice_len,
        config.slice_len.clamp(1, token::HEX256_LEN) + config.slice_len.clamp(1, token::HEX512_LEN)
    );

    // Open SQLite connection pool
    // CREATE the file if it doesn't exist yet
    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(
            config
                .database_url
                .parse::<sqlx::sqlite::SqliteConnectOptions>()?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal),
        )
        .await?;

    // Run embedded migrations (files in migrations/)
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations applied");

    // Wire the core: store, per-token rate limiter, analytics writer
    let store = Arc::new(SqliteStore::new(db.clone()));
    let limiter = Arc::new(TokenBucketLimiter::new(
        config.rate_limit_capacity,
        config.rate_limit_refill_per_sec,
    ));
    let analytics = AnalyticsSink::spawn_writer(db);

    let service = Shortener::new(
        store,
        limiter,
        analytics,
        config.slice_len,
        config.list_page_size,
    );

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState { service, config });

    // ── Router ─────────────────────────────────────────────────────────────
    let app = Router::new()
        .route("/p", get(handlers::shorten::shorten))
        .route("/s/:token", get(handlers::redirect::redirect))
        .route("/l", get(handlers::list::list))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
