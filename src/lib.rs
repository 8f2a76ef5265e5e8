//! Travel booking backend: cities, tour guides, travels, orders, reviews and user sessions
//! over PostgreSQL or an in-memory store.

pub mod config;
pub mod doc;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod session;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{AppConfig, Backend};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::{api_routes, common_routes};
pub use session::{MemorySessionStore, PgSessionStore, SessionStore};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application router: service routes plus every resource route.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(api_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
