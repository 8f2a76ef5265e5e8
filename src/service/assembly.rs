//! Response projections: a record's own fields plus its resolved relations.
//!
//! Collections are assembled with one batch fetch per relation type. A required relation
//! that cannot be resolved is an internal error, never a silently dropped row.

use crate::error::AppError;
use crate::model::{City, Order, Post, Review, TourGuide, Travel, User};
use crate::store::Store;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub type CityResponse = City;
pub type UserResponse = User;

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TourGuideResponse {
    #[serde(flatten)]
    pub guide: TourGuide,
    pub city: City,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TravelResponse {
    #[serde(flatten)]
    pub travel: Travel,
    pub city: City,
    /// `null` when the travel has no guide.
    pub guide: Option<TourGuideResponse>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub user: User,
    pub travel: TravelResponse,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub user: User,
    pub travel: TravelResponse,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
}

fn unique_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn index_by<T>(rows: Vec<T>, id: impl Fn(&T) -> i64) -> HashMap<i64, T> {
    rows.into_iter().map(|r| (id(&r), r)).collect()
}

fn resolve<'a, T>(map: &'a HashMap<i64, T>, id: i64, what: &str) -> Result<&'a T, AppError> {
    map.get(&id)
        .ok_or_else(|| AppError::Internal(format!("{} {} is referenced but missing", what, id)))
}

fn single<T>(mut rows: Vec<T>) -> Result<T, AppError> {
    rows.pop()
        .ok_or_else(|| AppError::Internal("assembly returned no row".into()))
}

pub async fn tour_guides(store: &dyn Store, guides: Vec<TourGuide>) -> Result<Vec<TourGuideResponse>, AppError> {
    let cities = store
        .cities_by_ids(&unique_ids(guides.iter().map(|g| g.city_id)))
        .await?;
    let cities = index_by(cities, |c| c.id);
    guides
        .into_iter()
        .map(|guide| {
            let city = resolve(&cities, guide.city_id, "City")?.clone();
            Ok(TourGuideResponse { guide, city })
        })
        .collect()
}

pub async fn tour_guide(store: &dyn Store, guide: TourGuide) -> Result<TourGuideResponse, AppError> {
    single(tour_guides(store, vec![guide]).await?)
}

pub async fn travels(store: &dyn Store, travels: Vec<Travel>) -> Result<Vec<TravelResponse>, AppError> {
    let guides = store
        .tour_guides_by_ids(&unique_ids(travels.iter().filter_map(|t| t.guide_id)))
        .await?;
    let city_ids = unique_ids(
        travels
            .iter()
            .map(|t| t.city_id)
            .chain(guides.iter().map(|g| g.city_id)),
    );
    let cities = index_by(store.cities_by_ids(&city_ids).await?, |c| c.id);
    let guides = index_by(guides, |g| g.id);

    travels
        .into_iter()
        .map(|travel| {
            let city = resolve(&cities, travel.city_id, "City")?.clone();
            let guide = match travel.guide_id {
                Some(guide_id) => {
                    let guide = resolve(&guides, guide_id, "Tour guide")?.clone();
                    let city = resolve(&cities, guide.city_id, "City")?.clone();
                    Some(TourGuideResponse { guide, city })
                }
                None => None,
            };
            Ok(TravelResponse { travel, city, guide })
        })
        .collect()
}

pub async fn travel(store: &dyn Store, travel: Travel) -> Result<TravelResponse, AppError> {
    single(travels(store, vec![travel]).await?)
}

/// Users and assembled travels referenced by a batch of orders or reviews.
async fn users_and_travels(
    store: &dyn Store,
    user_ids: Vec<i64>,
    travel_ids: Vec<i64>,
) -> Result<(HashMap<i64, User>, HashMap<i64, TravelResponse>), AppError> {
    let users = index_by(store.users_by_ids(&unique_ids(user_ids)).await?, |u| u.id);
    let raw = store.travels_by_ids(&unique_ids(travel_ids)).await?;
    let travels = index_by(travels(store, raw).await?, |t| t.travel.id);
    Ok((users, travels))
}

pub async fn orders(store: &dyn Store, orders: Vec<Order>) -> Result<Vec<OrderResponse>, AppError> {
    let (users, travels) = users_and_travels(
        store,
        orders.iter().map(|o| o.user_id).collect(),
        orders.iter().map(|o| o.travel_id).collect(),
    )
    .await?;
    orders
        .into_iter()
        .map(|order| {
            let user = resolve(&users, order.user_id, "User")?.clone();
            let travel = resolve(&travels, order.travel_id, "Travel")?.clone();
            Ok(OrderResponse { order, user, travel })
        })
        .collect()
}

pub async fn order(store: &dyn Store, order: Order) -> Result<OrderResponse, AppError> {
    single(orders(store, vec![order]).await?)
}

pub async fn reviews(store: &dyn Store, reviews: Vec<Review>) -> Result<Vec<ReviewResponse>, AppError> {
    let (users, travels) = users_and_travels(
        store,
        reviews.iter().map(|r| r.user_id).collect(),
        reviews.iter().map(|r| r.travel_id).collect(),
    )
    .await?;
    reviews
        .into_iter()
        .map(|review| {
            let user = resolve(&users, review.user_id, "User")?.clone();
            let travel = resolve(&travels, review.travel_id, "Travel")?.clone();
            Ok(ReviewResponse { review, user, travel })
        })
        .collect()
}

pub async fn review(store: &dyn Store, review: Review) -> Result<ReviewResponse, AppError> {
    single(reviews(store, vec![review]).await?)
}

pub async fn posts(store: &dyn Store, posts: Vec<Post>) -> Result<Vec<PostResponse>, AppError> {
    let users = store
        .users_by_ids(&unique_ids(posts.iter().map(|p| p.author_id)))
        .await?;
    let users = index_by(users, |u| u.id);
    posts
        .into_iter()
        .map(|post| {
            let author = resolve(&users, post.author_id, "User")?.clone();
            Ok(PostResponse { post, author })
        })
        .collect()
}

pub async fn post(store: &dyn Store, post: Post) -> Result<PostResponse, AppError> {
    single(posts(store, vec![post]).await?)
}
