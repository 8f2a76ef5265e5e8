//! Success response helpers. Bodies are the bare projections; deletes and logouts answer
//! with a confirmation message only.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Message {
    pub message: String,
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<Vec<T>>) {
    (StatusCode::OK, Json(data))
}

pub fn message(text: impl Into<String>) -> (StatusCode, Json<Message>) {
    (StatusCode::OK, Json(Message { message: text.into() }))
}

/// `{"message": "<entity> deleted successfully"}`
pub fn deleted(entity: &str) -> (StatusCode, Json<Message>) {
    message(format!("{} deleted successfully", entity))
}
