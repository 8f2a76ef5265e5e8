//! Tour guide handlers. Every guide belongs to an existing city.

use super::not_found;
use crate::error::AppError;
use crate::extractors::{Json, Path};
use crate::model::TourGuideForm;
use crate::response::{deleted, success_many, success_one_ok, Message};
use crate::service::{assembly, assembly::TourGuideResponse, Validate};
use crate::state::AppState;
use crate::store::{duplicate_name, missing_reference, Store};
use axum::{extract::State, response::IntoResponse};

async fn check_city(store: &dyn Store, city_id: i64) -> Result<(), AppError> {
    match store.city(city_id).await? {
        Some(_) => Ok(()),
        None => Err(missing_reference("City")),
    }
}

#[utoipa::path(post, path = "/tour_guide/create", request_body = TourGuideForm, tag = "tour_guides",
    responses((status = 200, body = TourGuideResponse), (status = 400, description = "Duplicate name or unknown city")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<TourGuideForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let store = state.store.as_ref();
    if store.tour_guide_by_name(&form.name).await?.is_some() {
        return Err(duplicate_name("Tour guide"));
    }
    check_city(store, form.city_id).await?;
    let guide = store.create_tour_guide(&form).await?;
    tracing::info!(guide_id = guide.id, city_id = guide.city_id, "tour guide created");
    Ok(success_one_ok(assembly::tour_guide(store, guide).await?))
}

#[utoipa::path(get, path = "/tour_guide/{id}", params(("id" = i64, Path)), tag = "tour_guides",
    responses((status = 200, body = TourGuideResponse), (status = 404, description = "Tour guide not found")))]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let guide = store.tour_guide(id).await?.ok_or_else(|| not_found("Tour guide"))?;
    Ok(success_one_ok(assembly::tour_guide(store, guide).await?))
}

#[utoipa::path(get, path = "/tour_guides/", tag = "tour_guides", responses((status = 200, body = [TourGuideResponse])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let guides = store.tour_guides().await?;
    Ok(success_many(assembly::tour_guides(store, guides).await?))
}

#[utoipa::path(put, path = "/tour_guide/{id}", params(("id" = i64, Path)), request_body = TourGuideForm, tag = "tour_guides",
    responses((status = 200, body = TourGuideResponse), (status = 404, description = "Tour guide not found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<TourGuideForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let store = state.store.as_ref();
    store.tour_guide(id).await?.ok_or_else(|| not_found("Tour guide"))?;
    if let Some(other) = store.tour_guide_by_name(&form.name).await? {
        if other.id != id {
            return Err(duplicate_name("Tour guide"));
        }
    }
    check_city(store, form.city_id).await?;
    let guide = store
        .update_tour_guide(id, &form)
        .await?
        .ok_or_else(|| not_found("Tour guide"))?;
    tracing::info!(guide_id = id, "tour guide updated");
    Ok(success_one_ok(assembly::tour_guide(store, guide).await?))
}

#[utoipa::path(delete, path = "/tour_guide/{id}", params(("id" = i64, Path)), tag = "tour_guides",
    responses((status = 200, body = Message), (status = 404, description = "Tour guide not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_tour_guide(id).await? {
        return Err(not_found("Tour guide"));
    }
    tracing::info!(guide_id = id, "tour guide deleted");
    Ok(deleted("Tour guide"))
}
