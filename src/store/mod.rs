//! Entity store: the `Store` trait and its PostgreSQL and in-memory implementations.
//!
//! Every write refuses dangling required references (`InvalidReference`), duplicate names
//! where a name is unique (`Conflict`), and deletes of rows other rows still point at
//! (`Conflict`). Reads return `None`/empty rather than `NotFound`; handlers decide.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::model::{
    City, CityForm, Order, OrderForm, Post, PostForm, Review, ReviewForm, TourGuide, TourGuideForm, Travel,
    TravelForm, User, UserForm,
};
use crate::service::query::TravelFilter;
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    async fn create_user(&self, form: &UserForm) -> Result<User, AppError>;
    async fn user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn users(&self) -> Result<Vec<User>, AppError>;
    async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError>;
    async fn users_by_credentials(&self, name: &str, age: i32) -> Result<Vec<User>, AppError>;
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    async fn create_city(&self, form: &CityForm) -> Result<City, AppError>;
    async fn city(&self, id: i64) -> Result<Option<City>, AppError>;
    async fn cities(&self) -> Result<Vec<City>, AppError>;
    async fn cities_by_ids(&self, ids: &[i64]) -> Result<Vec<City>, AppError>;
    async fn city_by_name(&self, name: &str) -> Result<Option<City>, AppError>;
    /// First city (lowest id) whose name contains `fragment`, ignoring case.
    async fn search_city(&self, fragment: &str) -> Result<Option<City>, AppError>;
    async fn update_city(&self, id: i64, form: &CityForm) -> Result<Option<City>, AppError>;
    async fn delete_city(&self, id: i64) -> Result<bool, AppError>;

    async fn create_tour_guide(&self, form: &TourGuideForm) -> Result<TourGuide, AppError>;
    async fn tour_guide(&self, id: i64) -> Result<Option<TourGuide>, AppError>;
    async fn tour_guides(&self) -> Result<Vec<TourGuide>, AppError>;
    async fn tour_guides_by_ids(&self, ids: &[i64]) -> Result<Vec<TourGuide>, AppError>;
    async fn tour_guide_by_name(&self, name: &str) -> Result<Option<TourGuide>, AppError>;
    async fn update_tour_guide(&self, id: i64, form: &TourGuideForm) -> Result<Option<TourGuide>, AppError>;
    async fn delete_tour_guide(&self, id: i64) -> Result<bool, AppError>;

    async fn create_travel(&self, form: &TravelForm) -> Result<Travel, AppError>;
    async fn travel(&self, id: i64) -> Result<Option<Travel>, AppError>;
    async fn travels(&self) -> Result<Vec<Travel>, AppError>;
    async fn travels_by_ids(&self, ids: &[i64]) -> Result<Vec<Travel>, AppError>;
    async fn travel_by_name(&self, name: &str) -> Result<Option<Travel>, AppError>;
    async fn search_travels(&self, filter: &TravelFilter) -> Result<Vec<Travel>, AppError>;
    async fn update_travel(&self, id: i64, form: &TravelForm) -> Result<Option<Travel>, AppError>;
    async fn delete_travel(&self, id: i64) -> Result<bool, AppError>;

    async fn create_order(&self, form: &OrderForm) -> Result<Order, AppError>;
    async fn order(&self, id: i64) -> Result<Option<Order>, AppError>;
    async fn orders(&self) -> Result<Vec<Order>, AppError>;
    async fn delete_order(&self, id: i64) -> Result<bool, AppError>;

    async fn create_review(&self, form: &ReviewForm) -> Result<Review, AppError>;
    async fn review(&self, id: i64) -> Result<Option<Review>, AppError>;
    async fn reviews(&self) -> Result<Vec<Review>, AppError>;
    async fn update_review(&self, id: i64, form: &ReviewForm) -> Result<Option<Review>, AppError>;
    async fn delete_review(&self, id: i64) -> Result<bool, AppError>;

    async fn create_post(&self, form: &PostForm) -> Result<Post, AppError>;
    async fn post(&self, id: i64) -> Result<Option<Post>, AppError>;
    async fn posts(&self) -> Result<Vec<Post>, AppError>;
    async fn update_post(&self, id: i64, form: &PostForm) -> Result<Option<Post>, AppError>;
    async fn delete_post(&self, id: i64) -> Result<bool, AppError>;
}

pub(crate) fn duplicate_name(entity: &str) -> AppError {
    AppError::Conflict(format!("{} with this name already exists.", entity))
}

pub(crate) fn missing_reference(entity: &str) -> AppError {
    AppError::InvalidReference(format!("{} not found.", entity))
}

pub(crate) fn still_referenced(entity: &str) -> AppError {
    AppError::Conflict(format!("{} is still referenced by other records.", entity))
}
