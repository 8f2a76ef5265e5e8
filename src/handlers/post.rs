//! Legacy post resource served under `/items`.

use super::not_found;
use crate::error::AppError;
use crate::extractors::{Json, Path, Query};
use crate::model::{PostForm, PostPatch};
use crate::response::{deleted, success_many, success_one_ok, Message};
use crate::service::{assembly, assembly::PostResponse, Validate};
use crate::state::AppState;
use crate::store::missing_reference;
use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostSearch {
    pub post_id: Option<i64>,
}

#[utoipa::path(get, path = "/items", tag = "posts", responses((status = 200, body = [PostResponse])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let posts = store.posts().await?;
    Ok(success_many(assembly::posts(store, posts).await?))
}

#[utoipa::path(get, path = "/items/{id}", params(("id" = i64, Path)), tag = "posts",
    responses((status = 200, body = PostResponse), (status = 404, description = "Post not found")))]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let post = store.post(id).await?.ok_or_else(|| not_found("Post"))?;
    Ok(success_one_ok(assembly::post(store, post).await?))
}

/// Without `post_id` the answer is `{"data": null}`.
#[utoipa::path(get, path = "/search", params(PostSearch), tag = "posts",
    responses((status = 200, body = PostResponse), (status = 404, description = "Post not found")))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<PostSearch>,
) -> Result<axum::response::Response, AppError> {
    let Some(id) = query.post_id else {
        return Ok(axum::Json(serde_json::json!({ "data": null })).into_response());
    };
    let store = state.store.as_ref();
    let post = store.post(id).await?.ok_or_else(|| not_found("Post"))?;
    Ok(success_one_ok(assembly::post(store, post).await?).into_response())
}

#[utoipa::path(post, path = "/items/create", request_body = PostForm, tag = "posts",
    responses((status = 200, body = PostResponse), (status = 400, description = "Unknown author")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let store = state.store.as_ref();
    if store.user(form.author_id).await?.is_none() {
        return Err(missing_reference("User"));
    }
    let post = store.create_post(&form).await?;
    tracing::info!(post_id = post.id, author_id = post.author_id, "post created");
    Ok(success_one_ok(assembly::post(store, post).await?))
}

/// Partial update: omitted fields keep their stored values.
#[utoipa::path(put, path = "/items/{id}", params(("id" = i64, Path)), request_body = PostPatch, tag = "posts",
    responses((status = 200, body = PostResponse), (status = 404, description = "Post not found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<PostPatch>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let existing = store.post(id).await?.ok_or_else(|| not_found("Post"))?;
    let form = patch.apply(&existing);
    form.validate()?;
    if form.author_id != existing.author_id && store.user(form.author_id).await?.is_none() {
        return Err(missing_reference("User"));
    }
    let post = store
        .update_post(id, &form)
        .await?
        .ok_or_else(|| not_found("Post"))?;
    tracing::info!(post_id = id, "post updated");
    Ok(success_one_ok(assembly::post(store, post).await?))
}

#[utoipa::path(delete, path = "/items/{id}", params(("id" = i64, Path)), tag = "posts",
    responses((status = 200, body = Message), (status = 404, description = "Post not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_post(id).await? {
        return Err(not_found("Post"));
    }
    tracing::info!(post_id = id, "post deleted");
    Ok(deleted("Post"))
}
