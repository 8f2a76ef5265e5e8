//! Server binary: reads configuration, prepares the database when a PostgreSQL backend is
//! selected, and serves the API.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use travel_booking::{
    app, apply_migrations, ensure_database_exists, AppConfig, AppState, Backend, MemorySessionStore, MemoryStore,
    PgSessionStore, PgStore, SessionStore, Store,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("travel_booking=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;

    let pool = if config.needs_database() {
        ensure_database_exists(&config.database_url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        apply_migrations(&pool, &config.schema).await?;
        Some(pool)
    } else {
        None
    };

    let store: Arc<dyn Store> = match (&config.storage, &pool) {
        (Backend::Postgres, Some(pool)) => Arc::new(PgStore::new(pool.clone(), config.schema.clone())),
        _ => Arc::new(MemoryStore::new()),
    };
    let sessions: Arc<dyn SessionStore> = match (&config.sessions, &pool) {
        (Backend::Postgres, Some(pool)) => Arc::new(PgSessionStore::new(pool.clone(), &config.schema)),
        _ => Arc::new(MemorySessionStore::new()),
    };
    tracing::info!(storage = ?config.storage, sessions = ?config.sessions, schema = %config.schema, "backends selected");

    let router = app(AppState::new(store, sessions), config.body_limit_bytes);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
