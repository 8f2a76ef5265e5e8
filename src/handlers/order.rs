//! Order handlers. Orders are created and removed, never edited.

use super::not_found;
use super::review::check_user_and_travel;
use crate::error::AppError;
use crate::extractors::{Json, Path};
use crate::model::OrderForm;
use crate::response::{deleted, success_many, success_one_ok, Message};
use crate::service::{assembly, assembly::OrderResponse, Validate};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

#[utoipa::path(post, path = "/order/create", request_body = OrderForm, tag = "orders",
    responses((status = 200, body = OrderResponse), (status = 400, description = "Unknown user or travel")))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<OrderForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()?;
    let store = state.store.as_ref();
    check_user_and_travel(store, form.user_id, form.travel_id).await?;
    let order = store.create_order(&form).await?;
    tracing::info!(order_id = order.id, user_id = order.user_id, travel_id = order.travel_id, "order created");
    Ok(success_one_ok(assembly::order(store, order).await?))
}

#[utoipa::path(get, path = "/order/{id}", params(("id" = i64, Path)), tag = "orders",
    responses((status = 200, body = OrderResponse), (status = 404, description = "Order not found")))]
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let order = store.order(id).await?.ok_or_else(|| not_found("Order"))?;
    Ok(success_one_ok(assembly::order(store, order).await?))
}

#[utoipa::path(get, path = "/orders", tag = "orders", responses((status = 200, body = [OrderResponse])))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let orders = store.orders().await?;
    Ok(success_many(assembly::orders(store, orders).await?))
}

#[utoipa::path(delete, path = "/order/{id}", params(("id" = i64, Path)), tag = "orders",
    responses((status = 200, body = Message), (status = 404, description = "Order not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_order(id).await? {
        return Err(not_found("Order"));
    }
    tracing::info!(order_id = id, "order deleted");
    Ok(deleted("Order"))
}
