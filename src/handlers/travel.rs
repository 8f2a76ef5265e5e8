//! Travel handlers, including the multi-predicate search.

use super::not_found;
use crate::error::AppError;
use crate::extractors::{Json, Path, Query};
use crate::model::TravelForm;
use crate::response::{deleted, success_many, success_one_ok, Message};
use crate::service::query::TravelFilter;
use crate::service::{assembly, assembly::TravelResponse, Validate};
use crate::state::AppState;
use crate::store::{duplicate_name, missing_reference, Store};
use axum::{extract::State, response::IntoResponse};

/// City must exist; the guide must exist when one is named.
async fn check_references(store: &dyn Store, form: &TravelForm) -> Result<(), AppError> {
    if store.city(form.city_id).await?.is_none() {
        return Err(missing_reference("City"));
    }
    if let Some(guide_id) = form.guide_id {
        if store.tour_guide(guide_id).await?.is_none() {
            return Err(missing_reference("Tour guide"));
        }
    }
    Ok(())
}

#[utoipa::path(post, path = "/travel/create", request_body = TravelForm, tag = "travels",
    responses((status = 200, body = TravelResponse), (status = 400, description = "Duplicate name or unknown reference")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<TravelForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let store = state.store.as_ref();
    if store.travel_by_name(&form.name).await?.is_some() {
        return Err(duplicate_name("Travel"));
    }
    check_references(store, &form).await?;
    let travel = store.create_travel(&form).await?;
    tracing::info!(travel_id = travel.id, city_id = travel.city_id, guide_id = ?travel.guide_id, "travel created");
    Ok(success_one_ok(assembly::travel(store, travel).await?))
}

#[utoipa::path(get, path = "/travel/{id}", params(("id" = i64, Path)), tag = "travels",
    responses((status = 200, body = TravelResponse), (status = 404, description = "Travel not found")))]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let travel = store.travel(id).await?.ok_or_else(|| not_found("Travel"))?;
    Ok(success_one_ok(assembly::travel(store, travel).await?))
}

#[utoipa::path(get, path = "/treves", tag = "travels", responses((status = 200, body = [TravelResponse])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let travels = store.travels().await?;
    Ok(success_many(assembly::travels(store, travels).await?))
}

#[utoipa::path(get, path = "/travels/search", params(TravelFilter), tag = "travels",
    responses((status = 200, body = [TravelResponse]), (status = 404, description = "No travel matches the filters"),
        (status = 422, description = "Non-finite price bound")))]
pub async fn search(
    State(state): State<AppState>,
    Query(filter): Query<TravelFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter.validate()?;
    let store = state.store.as_ref();
    let travels = store.search_travels(&filter).await?;
    if travels.is_empty() {
        return Err(AppError::NotFound("No travels found for the given filters".into()));
    }
    tracing::debug!(matches = travels.len(), "travel search");
    Ok(success_many(assembly::travels(store, travels).await?))
}

#[utoipa::path(put, path = "/travel/{id}", params(("id" = i64, Path)), request_body = TravelForm, tag = "travels",
    responses((status = 200, body = TravelResponse), (status = 404, description = "Travel not found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<TravelForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let store = state.store.as_ref();
    store.travel(id).await?.ok_or_else(|| not_found("Travel"))?;
    if let Some(other) = store.travel_by_name(&form.name).await? {
        if other.id != id {
            return Err(duplicate_name("Travel"));
        }
    }
    check_references(store, &form).await?;
    let travel = store
        .update_travel(id, &form)
        .await?
        .ok_or_else(|| not_found("Travel"))?;
    tracing::info!(travel_id = id, "travel updated");
    Ok(success_one_ok(assembly::travel(store, travel).await?))
}

#[utoipa::path(delete, path = "/travel/{id}", params(("id" = i64, Path)), tag = "travels",
    responses((status = 200, body = Message), (status = 404, description = "Travel not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_travel(id).await? {
        return Err(not_found("Travel"));
    }
    tracing::info!(travel_id = id, "travel deleted");
    Ok(deleted("Travel"))
}
