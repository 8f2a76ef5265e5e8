//! Resource routes. Paths are kept exactly as existing clients call them, including
//! `/tour_guides/` with its trailing slash and `/treves` for the travel list.

use crate::handlers::{city, order, post, review, tour_guide, travel, user};
use crate::state::AppState;
use axum::{
    routing::{get, post as post_method, put},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/city/create", post_method(city::create))
        .route("/city", get(city::read))
        .route("/cities", get(city::list))
        .route("/city/:id", put(city::update).delete(city::delete))
        .route("/tour_guide/create", post_method(tour_guide::create))
        .route("/tour_guides/", get(tour_guide::list))
        .route(
            "/tour_guide/:id",
            get(tour_guide::read).put(tour_guide::update).delete(tour_guide::delete),
        )
        .route("/travel/create", post_method(travel::create))
        .route("/treves", get(travel::list))
        .route("/travels/search", get(travel::search))
        .route(
            "/travel/:id",
            get(travel::read).put(travel::update).delete(travel::delete),
        )
        .route("/review/create", post_method(review::create))
        .route("/reviews", get(review::list))
        .route(
            "/review/:id",
            get(review::read).put(review::update).delete(review::delete),
        )
        .route("/user/create", post_method(user::create))
        .route("/user/login", post_method(user::login))
        .route("/user/logout", post_method(user::logout))
        .route("/users", get(user::list))
        .route("/user/:id", get(user::read).delete(user::delete))
        .route("/order/create", post_method(order::create))
        .route("/orders", get(order::list))
        .route("/order/:id", get(order::read).delete(order::delete))
        .route("/items", get(post::list))
        .route("/items/create", post_method(post::create))
        .route(
            "/items/:id",
            get(post::read).put(post::update).delete(post::delete),
        )
        .route("/search", get(post::search))
        .with_state(state)
}
