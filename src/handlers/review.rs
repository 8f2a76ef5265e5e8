//! Review handlers.

use super::not_found;
use crate::error::AppError;
use crate::extractors::{Json, Path};
use crate::model::ReviewForm;
use crate::response::{deleted, success_many, success_one_ok, Message};
use crate::service::{assembly, assembly::ReviewResponse};
use crate::state::AppState;
use crate::store::{missing_reference, Store};
use axum::{extract::State, response::IntoResponse};

/// Reviewer and reviewed travel must both exist.
pub(crate) async fn check_user_and_travel(store: &dyn Store, user_id: i64, travel_id: i64) -> Result<(), AppError> {
    if store.user(user_id).await?.is_none() {
        return Err(missing_reference("User"));
    }
    if store.travel(travel_id).await?.is_none() {
        return Err(missing_reference("Travel"));
    }
    Ok(())
}

#[utoipa::path(post, path = "/review/create", request_body = ReviewForm, tag = "reviews",
    responses((status = 200, body = ReviewResponse), (status = 400, description = "Unknown user or travel")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<ReviewForm>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    check_user_and_travel(store, form.user_id, form.travel_id).await?;
    let review = store.create_review(&form).await?;
    tracing::info!(review_id = review.id, travel_id = review.travel_id, "review created");
    Ok(success_one_ok(assembly::review(store, review).await?))
}

#[utoipa::path(get, path = "/review/{id}", params(("id" = i64, Path)), tag = "reviews",
    responses((status = 200, body = ReviewResponse), (status = 404, description = "Review not found")))]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let review = store.review(id).await?.ok_or_else(|| not_found("Review"))?;
    Ok(success_one_ok(assembly::review(store, review).await?))
}

#[utoipa::path(get, path = "/reviews", tag = "reviews", responses((status = 200, body = [ReviewResponse])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let reviews = store.reviews().await?;
    Ok(success_many(assembly::reviews(store, reviews).await?))
}

/// Full replace. An omitted `created_at` keeps the stored timestamp.
#[utoipa::path(put, path = "/review/{id}", params(("id" = i64, Path)), request_body = ReviewForm, tag = "reviews",
    responses((status = 200, body = ReviewResponse), (status = 404, description = "Review not found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut form): Json<ReviewForm>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let existing = store.review(id).await?.ok_or_else(|| not_found("Review"))?;
    check_user_and_travel(store, form.user_id, form.travel_id).await?;
    form.created_at.get_or_insert(existing.created_at);
    let review = store
        .update_review(id, &form)
        .await?
        .ok_or_else(|| not_found("Review"))?;
    tracing::info!(review_id = id, "review updated");
    Ok(success_one_ok(assembly::review(store, review).await?))
}

#[utoipa::path(delete, path = "/review/{id}", params(("id" = i64, Path)), tag = "reviews",
    responses((status = 200, body = Message), (status = 404, description = "Review not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_review(id).await? {
        return Err(not_found("Review"));
    }
    tracing::info!(review_id = id, "review deleted");
    Ok(deleted("Review"))
}
