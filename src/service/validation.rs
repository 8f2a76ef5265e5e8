//! Request validation for create and replace forms and for search filters.

use crate::error::AppError;
use crate::model::{CityForm, LoginForm, OrderForm, PostForm, TourGuideForm, TravelForm, UserForm};
use crate::service::query::TravelFilter;

/// Field rules a form must satisfy before any store access.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

fn required(col: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", col)));
    }
    Ok(())
}

fn length_between(col: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min {
        return Err(AppError::Validation(format!("{} must be at least {} characters", col, min)));
    }
    if len > max {
        return Err(AppError::Validation(format!("{} must be at most {} characters", col, max)));
    }
    Ok(())
}

fn at_least<T: PartialOrd + std::fmt::Display>(col: &str, value: T, min: T) -> Result<(), AppError> {
    if value < min {
        return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
    }
    Ok(())
}

fn at_most<T: PartialOrd + std::fmt::Display>(col: &str, value: T, max: T) -> Result<(), AppError> {
    if value > max {
        return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
    }
    Ok(())
}

impl Validate for UserForm {
    fn validate(&self) -> Result<(), AppError> {
        length_between("name", &self.name, 5, 20)?;
        at_least("age", self.age, 5)?;
        at_most("age", self.age, 120)
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), AppError> {
        required("name", &self.name)
    }
}

impl Validate for CityForm {
    fn validate(&self) -> Result<(), AppError> {
        required("name", &self.name)
    }
}

impl Validate for TourGuideForm {
    fn validate(&self) -> Result<(), AppError> {
        required("name", &self.name)?;
        at_least("experience_years", self.experience_years, 0)
    }
}

impl Validate for TravelForm {
    fn validate(&self) -> Result<(), AppError> {
        required("name", &self.name)?;
        required("duration", &self.duration)?;
        finite("price", self.price)
    }
}

impl Validate for OrderForm {
    fn validate(&self) -> Result<(), AppError> {
        match &self.status {
            Some(status) => required("status", status),
            None => Ok(()),
        }
    }
}

fn finite(col: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::Validation(format!("{} must be a finite number", col)));
    }
    Ok(())
}

/// NaN and infinite price bounds compare differently in memory and in PostgreSQL.
impl Validate for TravelFilter {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(p) = self.min_price {
            finite("min_price", p)?;
        }
        if let Some(p) = self.max_price {
            finite("max_price", p)?;
        }
        Ok(())
    }
}

impl Validate for PostForm {
    fn validate(&self) -> Result<(), AppError> {
        required("title", &self.title)
    }
}
