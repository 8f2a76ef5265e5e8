//! PostgreSQL store. Each call checks a connection out of the pool for its duration only.

use super::{duplicate_name, missing_reference, still_referenced, Store};
use crate::error::AppError;
use crate::model::{
    City, CityForm, Order, OrderForm, Post, PostForm, Review, ReviewForm, TourGuide, TourGuideForm, Travel,
    TravelForm, User, UserForm,
};
use crate::service::query::TravelFilter;
use crate::sql::tables::{Table, CITIES, ORDERS, POSTS, REVIEWS, TOUR_GUIDES, TRAVELS, USERS};
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{ConnectOptions, FromRow, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

type Values = Vec<(&'static str, PgBindValue)>;

fn user_values(f: &UserForm) -> Values {
    vec![("name", f.name.clone().into()), ("age", f.age.into())]
}

fn city_values(f: &CityForm) -> Values {
    vec![
        ("name", f.name.clone().into()),
        ("description", f.description.clone().into()),
        ("image_url", f.image_url.clone().into()),
    ]
}

fn tour_guide_values(f: &TourGuideForm) -> Values {
    vec![
        ("name", f.name.clone().into()),
        ("experience_years", f.experience_years.into()),
        ("bio", f.bio.clone().into()),
        ("contact_info", f.contact_info.clone().into()),
        ("city_id", f.city_id.into()),
    ]
}

fn travel_values(f: &TravelForm) -> Values {
    vec![
        ("name", f.name.clone().into()),
        ("description", f.description.clone().into()),
        ("price", f.price.into()),
        ("duration", f.duration.clone().into()),
        ("start_date", f.start_date.into()),
        ("end_date", f.end_date.into()),
        ("image_url", f.image_url.clone().into()),
        ("city_id", f.city_id.into()),
        ("guide_id", f.guide_id.into()),
    ]
}

fn order_values(f: &OrderForm) -> Values {
    vec![
        ("user_id", f.user_id.into()),
        ("travel_id", f.travel_id.into()),
        ("order_date", f.order_date_or(Utc::now()).into()),
        ("status", f.status_or_default().into()),
    ]
}

fn review_values(f: &ReviewForm) -> Values {
    vec![
        ("user_id", f.user_id.into()),
        ("travel_id", f.travel_id.into()),
        ("rating", f.rating.into()),
        ("comment", f.comment.clone().into()),
        ("created_at", f.created_at_or(Utc::now()).into()),
    ]
}

fn post_values(f: &PostForm) -> Values {
    vec![
        ("title", f.title.clone().into()),
        ("text", f.text.clone().into()),
        ("author_id", f.author_id.into()),
    ]
}

/// Which entity a foreign-key constraint points at, from PostgreSQL's default constraint names
/// (`<table>_<column>_fkey`).
fn referenced_entity(constraint: Option<&str>) -> &'static str {
    match constraint.unwrap_or("") {
        c if c.contains("guide_id") => "Tour guide",
        c if c.contains("city_id") => "City",
        c if c.contains("travel_id") => "Travel",
        c if c.contains("user_id") || c.contains("author_id") => "User",
        _ => "Referenced record",
    }
}

/// Translate constraint violations raised by an INSERT or UPDATE.
fn map_write_error(e: sqlx::Error, entity: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return duplicate_name(entity);
        }
        if db.is_foreign_key_violation() {
            return missing_reference(referenced_entity(db.constraint()));
        }
    }
    AppError::Db(e)
}

/// Translate a foreign-key violation raised by a DELETE (the row is still referenced).
fn map_delete_error(e: sqlx::Error, entity: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return still_referenced(entity);
        }
    }
    AppError::Db(e)
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_optional<T>(&self, q: QueryBuf) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        query.fetch_optional(&self.pool).await
    }

    async fn fetch_all<T>(&self, q: QueryBuf) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn by_id<T>(&self, table: &Table, id: i64) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        Ok(self.fetch_optional(sql::select_by_id(&self.schema, table, id)).await?)
    }

    async fn by_ids<T>(&self, table: &Table, ids: &[i64]) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_all(sql::select_by_ids(&self.schema, table, ids)).await
    }

    async fn all<T>(&self, table: &Table) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.fetch_all(sql::select_all(&self.schema, table)).await
    }

    async fn by_name<T>(&self, table: &Table, name: &str) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let q = sql::select_where_eq(&self.schema, table, "name", name.into());
        Ok(self.fetch_optional(q).await?)
    }

    async fn insert<T>(&self, table: &Table, values: Values, entity: &str) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let q = sql::insert(&self.schema, table, values);
        let row = self
            .fetch_optional(q)
            .await
            .map_err(|e| map_write_error(e, entity))?;
        row.ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update<T>(&self, table: &Table, id: i64, values: Values, entity: &str) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let q = sql::update(&self.schema, table, id, values);
        self.fetch_optional(q).await.map_err(|e| map_write_error(e, entity))
    }

    async fn delete(&self, table: &Table, id: i64, entity: &str) -> Result<bool, AppError> {
        let q = sql::delete(&self.schema, table, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, entity))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, form: &UserForm) -> Result<User, AppError> {
        self.insert(&USERS, user_values(form), "User").await
    }

    async fn user(&self, id: i64) -> Result<Option<User>, AppError> {
        self.by_id(&USERS, id).await
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        self.all(&USERS).await
    }

    async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        self.by_ids(&USERS, ids).await
    }

    async fn users_by_credentials(&self, name: &str, age: i32) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT \"id\", \"name\", \"age\" FROM {} WHERE \"name\" = $1 AND \"age\" = $2 ORDER BY \"id\"",
            sql::qualified_table(&self.schema, USERS.name)
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(age)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&USERS, id, "User").await
    }

    async fn create_city(&self, form: &CityForm) -> Result<City, AppError> {
        self.insert(&CITIES, city_values(form), "City").await
    }

    async fn city(&self, id: i64) -> Result<Option<City>, AppError> {
        self.by_id(&CITIES, id).await
    }

    async fn cities(&self) -> Result<Vec<City>, AppError> {
        self.all(&CITIES).await
    }

    async fn cities_by_ids(&self, ids: &[i64]) -> Result<Vec<City>, AppError> {
        self.by_ids(&CITIES, ids).await
    }

    async fn city_by_name(&self, name: &str) -> Result<Option<City>, AppError> {
        self.by_name(&CITIES, name).await
    }

    async fn search_city(&self, fragment: &str) -> Result<Option<City>, AppError> {
        let q = sql::select_first_containing(&self.schema, &CITIES, "name", fragment);
        Ok(self.fetch_optional(q).await?)
    }

    async fn update_city(&self, id: i64, form: &CityForm) -> Result<Option<City>, AppError> {
        self.update(&CITIES, id, city_values(form), "City").await
    }

    async fn delete_city(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&CITIES, id, "City").await
    }

    async fn create_tour_guide(&self, form: &TourGuideForm) -> Result<TourGuide, AppError> {
        self.insert(&TOUR_GUIDES, tour_guide_values(form), "Tour guide").await
    }

    async fn tour_guide(&self, id: i64) -> Result<Option<TourGuide>, AppError> {
        self.by_id(&TOUR_GUIDES, id).await
    }

    async fn tour_guides(&self) -> Result<Vec<TourGuide>, AppError> {
        self.all(&TOUR_GUIDES).await
    }

    async fn tour_guides_by_ids(&self, ids: &[i64]) -> Result<Vec<TourGuide>, AppError> {
        self.by_ids(&TOUR_GUIDES, ids).await
    }

    async fn tour_guide_by_name(&self, name: &str) -> Result<Option<TourGuide>, AppError> {
        self.by_name(&TOUR_GUIDES, name).await
    }

    async fn update_tour_guide(&self, id: i64, form: &TourGuideForm) -> Result<Option<TourGuide>, AppError> {
        self.update(&TOUR_GUIDES, id, tour_guide_values(form), "Tour guide").await
    }

    async fn delete_tour_guide(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&TOUR_GUIDES, id, "Tour guide").await
    }

    async fn create_travel(&self, form: &TravelForm) -> Result<Travel, AppError> {
        self.insert(&TRAVELS, travel_values(form), "Travel").await
    }

    async fn travel(&self, id: i64) -> Result<Option<Travel>, AppError> {
        self.by_id(&TRAVELS, id).await
    }

    async fn travels(&self) -> Result<Vec<Travel>, AppError> {
        self.all(&TRAVELS).await
    }

    async fn travels_by_ids(&self, ids: &[i64]) -> Result<Vec<Travel>, AppError> {
        self.by_ids(&TRAVELS, ids).await
    }

    async fn travel_by_name(&self, name: &str) -> Result<Option<Travel>, AppError> {
        self.by_name(&TRAVELS, name).await
    }

    async fn search_travels(&self, filter: &TravelFilter) -> Result<Vec<Travel>, AppError> {
        self.fetch_all(sql::search_travels(&self.schema, filter)).await
    }

    async fn update_travel(&self, id: i64, form: &TravelForm) -> Result<Option<Travel>, AppError> {
        self.update(&TRAVELS, id, travel_values(form), "Travel").await
    }

    async fn delete_travel(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&TRAVELS, id, "Travel").await
    }

    async fn create_order(&self, form: &OrderForm) -> Result<Order, AppError> {
        self.insert(&ORDERS, order_values(form), "Order").await
    }

    async fn order(&self, id: i64) -> Result<Option<Order>, AppError> {
        self.by_id(&ORDERS, id).await
    }

    async fn orders(&self) -> Result<Vec<Order>, AppError> {
        self.all(&ORDERS).await
    }

    async fn delete_order(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&ORDERS, id, "Order").await
    }

    async fn create_review(&self, form: &ReviewForm) -> Result<Review, AppError> {
        self.insert(&REVIEWS, review_values(form), "Review").await
    }

    async fn review(&self, id: i64) -> Result<Option<Review>, AppError> {
        self.by_id(&REVIEWS, id).await
    }

    async fn reviews(&self) -> Result<Vec<Review>, AppError> {
        self.all(&REVIEWS).await
    }

    async fn update_review(&self, id: i64, form: &ReviewForm) -> Result<Option<Review>, AppError> {
        self.update(&REVIEWS, id, review_values(form), "Review").await
    }

    async fn delete_review(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&REVIEWS, id, "Review").await
    }

    async fn create_post(&self, form: &PostForm) -> Result<Post, AppError> {
        self.insert(&POSTS, post_values(form), "Post").await
    }

    async fn post(&self, id: i64) -> Result<Option<Post>, AppError> {
        self.by_id(&POSTS, id).await
    }

    async fn posts(&self) -> Result<Vec<Post>, AppError> {
        self.all(&POSTS).await
    }

    async fn update_post(&self, id: i64, form: &PostForm) -> Result<Option<Post>, AppError> {
        self.update(&POSTS, id, post_values(form), "Post").await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        self.delete(&POSTS, id, "Post").await
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
