//! City handlers: create, lookup by id or name fragment, list, replace, delete.

use super::not_found;
use crate::error::AppError;
use crate::extractors::{Json, Path, Query};
use crate::model::{City, CityForm};
use crate::response::{deleted, success_many, success_one_ok, Message};
use crate::service::Validate;
use crate::state::AppState;
use crate::store::duplicate_name;
use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::IntoParams;

/// `GET /city` lookup. A non-empty `filter` wins over `id`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CityQuery {
    /// City id, at least 1.
    pub id: Option<i64>,
    /// Case-insensitive fragment of the city name.
    pub filter: Option<String>,
}

#[utoipa::path(post, path = "/city/create", request_body = CityForm, tag = "cities",
    responses((status = 200, body = City), (status = 400, description = "Name already taken")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<CityForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    if state.store.city_by_name(&form.name).await?.is_some() {
        return Err(duplicate_name("City"));
    }
    let city = state.store.create_city(&form).await?;
    tracing::info!(city_id = city.id, name = %city.name, "city created");
    Ok(success_one_ok(city))
}

#[utoipa::path(get, path = "/city", params(CityQuery), tag = "cities",
    responses((status = 200, body = City), (status = 404, description = "No matching city")))]
pub async fn read(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let fragment = query.filter.as_deref().map(str::trim).filter(|f| !f.is_empty());
    let city = match (fragment, query.id) {
        (Some(fragment), _) => state.store.search_city(fragment).await?,
        (None, Some(id)) if id < 1 => {
            return Err(AppError::Validation("id must be at least 1".into()));
        }
        (None, Some(id)) => state.store.city(id).await?,
        (None, None) => None,
    };
    city.map(success_one_ok).ok_or_else(|| not_found("City"))
}

#[utoipa::path(get, path = "/cities", tag = "cities", responses((status = 200, body = [City])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(state.store.cities().await?))
}

#[utoipa::path(put, path = "/city/{id}", params(("id" = i64, Path)), request_body = CityForm, tag = "cities",
    responses((status = 200, body = City), (status = 404, description = "City not found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<CityForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    state.store.city(id).await?.ok_or_else(|| not_found("City"))?;
    if let Some(other) = state.store.city_by_name(&form.name).await? {
        if other.id != id {
            return Err(duplicate_name("City"));
        }
    }
    let city = state
        .store
        .update_city(id, &form)
        .await?
        .ok_or_else(|| not_found("City"))?;
    tracing::info!(city_id = id, "city updated");
    Ok(success_one_ok(city))
}

#[utoipa::path(delete, path = "/city/{id}", params(("id" = i64, Path)), tag = "cities",
    responses((status = 200, body = Message), (status = 404, description = "City not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_city(id).await? {
        return Err(not_found("City"));
    }
    tracing::info!(city_id = id, "city deleted");
    Ok(deleted("City"))
}
