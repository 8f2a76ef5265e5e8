//! Search predicates shared by every store implementation.

use crate::model::Travel;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

/// Optional predicates for `GET /travels/search`. Present predicates are ANDed; absent ones
/// are not applied, so the default filter matches every travel.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TravelFilter {
    /// Name of the travel's city, compared case-insensitively.
    pub name_city: Option<String>,
    /// Travels starting on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Travels ending on or before this date.
    pub end_date: Option<NaiveDate>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Exact duration text, e.g. "7 days".
    pub duration: Option<String>,
}

impl TravelFilter {
    /// City name predicate, ignoring an empty `name_city=` parameter.
    pub fn city_name(&self) -> Option<&str> {
        self.name_city.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.city_name().is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.duration.is_none()
    }

    pub fn matches(&self, travel: &Travel, city_name: &str) -> bool {
        if let Some(wanted) = self.city_name() {
            if wanted.to_lowercase() != city_name.to_lowercase() {
                return false;
            }
        }
        if self.start_date.is_some_and(|d| travel.start_date < d) {
            return false;
        }
        if self.end_date.is_some_and(|d| travel.end_date > d) {
            return false;
        }
        if self.min_price.is_some_and(|p| travel.price < p) {
            return false;
        }
        if self.max_price.is_some_and(|p| travel.price > p) {
            return false;
        }
        if let Some(duration) = &self.duration {
            if travel.duration != *duration {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring test used by the in-memory city search.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// `ILIKE` pattern matching `fragment` anywhere, with `%`, `_` and `\` taken literally.
pub fn like_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
