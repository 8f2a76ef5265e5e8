//! User handlers and the login/logout session pair.

use super::not_found;
use crate::error::AppError;
use crate::extractors::{Json, Path};
use crate::model::{LoginForm, LogoutForm, User, UserForm};
use crate::response::{deleted, message, success_many, success_one_ok, Message};
use crate::service::Validate;
use crate::session::mint_token;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
}

#[utoipa::path(post, path = "/user/create", request_body = UserForm, tag = "users",
    responses((status = 200, body = User), (status = 422, description = "Name or age out of range")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<UserForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let user = state.store.create_user(&form).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok(success_one_ok(user))
}

#[utoipa::path(get, path = "/user/{id}", params(("id" = i64, Path)), tag = "users",
    responses((status = 200, body = User), (status = 404, description = "User not found")))]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.store.user(id).await?.ok_or_else(|| not_found("User"))?;
    Ok(success_one_ok(user))
}

#[utoipa::path(get, path = "/users", tag = "users", responses((status = 200, body = [User])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(state.store.users().await?))
}

#[utoipa::path(delete, path = "/user/{id}", params(("id" = i64, Path)), tag = "users",
    responses((status = 200, body = Message), (status = 404, description = "User not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_user(id).await? {
        return Err(not_found("User"));
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(deleted("User"))
}

/// Exactly one user must match both name and age.
#[utoipa::path(post, path = "/user/login", request_body = LoginForm, tag = "users",
    responses((status = 200, body = LoginResponse), (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let matches = state.store.users_by_credentials(&form.name, form.age).await?;
    let user = match matches.as_slice() {
        [user] => user,
        _ => {
            tracing::warn!(name = %form.name, matches = matches.len(), "login refused");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };
    let token = mint_token();
    state.sessions.put(&token, user.id).await?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok(success_one_ok(LoginResponse {
        token,
        user_id: user.id,
    }))
}

#[utoipa::path(post, path = "/user/logout", request_body = LogoutForm, tag = "users",
    responses((status = 200, body = Message), (status = 404, description = "Unknown session token")))]
pub async fn logout(
    State(state): State<AppState>,
    Json(form): Json<LogoutForm>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = state
        .sessions
        .delete(&form.token)
        .await?
        .ok_or_else(|| not_found("Session"))?;
    tracing::info!(user_id, "user logged out");
    Ok(message("Logged out successfully"))
}
