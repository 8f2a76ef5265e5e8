//! Persistent records and the request forms that create or replace them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status assigned to an order created without one.
pub const DEFAULT_ORDER_STATUS: &str = "pending";

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct TourGuide {
    pub id: i64,
    pub name: String,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub contact_info: String,
    pub city_id: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Travel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub image_url: Option<String>,
    pub city_id: i64,
    /// Travels may run without a guide.
    pub guide_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub travel_id: i64,
    pub order_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub travel_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Legacy post resource, kept for the `/items` endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub author_id: i64,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct UserForm {
    pub name: String,
    pub age: i32,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub name: String,
    pub age: i32,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct LogoutForm {
    pub token: String,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct CityForm {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct TourGuideForm {
    pub name: String,
    pub experience_years: i32,
    #[serde(default)]
    pub bio: Option<String>,
    pub contact_info: String,
    pub city_id: i64,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct TravelForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub duration: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub image_url: Option<String>,
    pub city_id: i64,
    #[serde(default)]
    pub guide_id: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct OrderForm {
    pub user_id: i64,
    pub travel_id: i64,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderForm {
    pub fn order_date_or(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.order_date.unwrap_or(now)
    }

    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_ORDER_STATUS)
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct ReviewForm {
    pub user_id: i64,
    pub travel_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ReviewForm {
    pub fn created_at_or(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.created_at.unwrap_or(now)
    }
}

/// Older clients send `body` and `creater_id`.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct PostForm {
    pub title: String,
    #[serde(alias = "body")]
    pub text: String,
    #[serde(alias = "creater_id")]
    pub author_id: i64,
}

/// Partial update of a post: omitted fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "body")]
    pub text: Option<String>,
    #[serde(default, alias = "creater_id")]
    pub author_id: Option<i64>,
}

impl PostPatch {
    pub fn apply(&self, post: &Post) -> PostForm {
        PostForm {
            title: self.title.clone().unwrap_or_else(|| post.title.clone()),
            text: self.text.clone().unwrap_or_else(|| post.text.clone()),
            author_id: self.author_id.unwrap_or(post.author_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn travel_form_without_guide_deserializes_to_none() {
        let form: TravelForm = serde_json::from_value(serde_json::json!({
            "name": "Alps",
            "price": 1200.0,
            "duration": "7 days",
            "start_date": "2025-06-01",
            "end_date": "2025-06-08",
            "city_id": 1
        }))
        .unwrap();
        assert_eq!(form.guide_id, None);
        assert_eq!(form.description, None);
    }

    #[test]
    fn order_defaults_apply_when_omitted() {
        let form: OrderForm = serde_json::from_str(r#"{"user_id":1,"travel_id":2}"#).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(form.order_date_or(now), now);
        assert_eq!(form.status_or_default(), "pending");
    }

    #[test]
    fn post_form_accepts_legacy_field_names() {
        let form: PostForm =
            serde_json::from_str(r#"{"title":"cats","body":"they run","creater_id":3}"#).unwrap();
        assert_eq!(form.text, "they run");
        assert_eq!(form.author_id, 3);
    }

    #[test]
    fn post_patch_keeps_omitted_fields() {
        let post = Post {
            id: 1,
            title: "before".into(),
            text: "old text".into(),
            author_id: 7,
        };
        let patch = PostPatch {
            title: Some("after".into()),
            ..Default::default()
        };
        let merged = patch.apply(&post);
        assert_eq!(merged.title, "after");
        assert_eq!(merged.text, "old text");
        assert_eq!(merged.author_id, 7);
    }
}
