//! Login sessions: opaque token -> user id.
//!
//! Login and logout of the same token are not ordered against each other; two concurrent
//! logouts may both observe the token before either removes it.

use crate::error::AppError;
use crate::sql::qualified_table;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, token: &str, user_id: i64) -> Result<(), AppError>;
    async fn get(&self, token: &str) -> Result<Option<i64>, AppError>;
    /// Remove `token`, returning the user it belonged to; `None` when it was not present.
    async fn delete(&self, token: &str) -> Result<Option<i64>, AppError>;
}

/// New opaque session token (random UUID v4, hex without dashes).
pub fn mint_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Sessions held in process memory; lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    tokens: RwLock<HashMap<String, i64>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> AppError {
    AppError::Internal("session store lock poisoned".into())
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, token: &str, user_id: i64) -> Result<(), AppError> {
        self.tokens
            .write()
            .map_err(|_| poisoned())?
            .insert(token.to_string(), user_id);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<i64>, AppError> {
        Ok(self.tokens.read().map_err(|_| poisoned())?.get(token).copied())
    }

    async fn delete(&self, token: &str) -> Result<Option<i64>, AppError> {
        Ok(self.tokens.write().map_err(|_| poisoned())?.remove(token))
    }
}

/// Sessions in the `sessions` table, surviving restarts.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
    table: String,
}

impl PgSessionStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgSessionStore {
            pool,
            table: qualified_table(schema, "sessions"),
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn put(&self, token: &str, user_id: i64) -> Result<(), AppError> {
        let sql = format!(
            r#"
            INSERT INTO {} (token, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (token)
            DO UPDATE SET user_id = $2, created_at = NOW()
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<i64>, AppError> {
        let sql = format!("SELECT user_id FROM {} WHERE token = $1", self.table);
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    async fn delete(&self, token: &str) -> Result<Option<i64>, AppError> {
        let sql = format!("DELETE FROM {} WHERE token = $1 RETURNING user_id", self.table);
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }
}
