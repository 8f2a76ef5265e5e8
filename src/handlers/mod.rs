//! HTTP handlers, one module per resource.

pub mod city;
pub mod order;
pub mod post;
pub mod review;
pub mod tour_guide;
pub mod travel;
pub mod user;

use crate::error::AppError;

pub(crate) fn not_found(entity: &str) -> AppError {
    AppError::NotFound(format!("{} not found", entity))
}
