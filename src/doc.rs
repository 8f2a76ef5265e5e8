//! OpenAPI document for the HTTP interface, served at `GET /openapi.json`.

use crate::error::ErrorBody;
use crate::handlers::{city, order, post, review, tour_guide, travel, user};
use crate::model::{
    City, CityForm, LoginForm, LogoutForm, Order, OrderForm, Post, PostForm, PostPatch, Review, ReviewForm,
    TourGuide, TourGuideForm, Travel, TravelForm, User, UserForm,
};
use crate::response::Message;
use crate::service::assembly::{OrderResponse, PostResponse, ReviewResponse, TourGuideResponse, TravelResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Travel booking API",
        description = "Cities, tour guides, travels, orders, reviews and user sessions."
    ),
    paths(
        city::create, city::read, city::list, city::update, city::delete,
        tour_guide::create, tour_guide::read, tour_guide::list, tour_guide::update, tour_guide::delete,
        travel::create, travel::read, travel::list, travel::search, travel::update, travel::delete,
        review::create, review::read, review::list, review::update, review::delete,
        user::create, user::read, user::list, user::delete, user::login, user::logout,
        order::create, order::read, order::list, order::delete,
        post::list, post::read, post::search, post::create, post::update, post::delete,
    ),
    components(schemas(
        City, TourGuide, Travel, User, Order, Review, Post,
        CityForm, TourGuideForm, TravelForm, UserForm, LoginForm, LogoutForm, OrderForm, ReviewForm,
        PostForm, PostPatch,
        TourGuideResponse, TravelResponse, OrderResponse, ReviewResponse, PostResponse,
        user::LoginResponse, Message, ErrorBody,
    )),
    tags(
        (name = "cities"), (name = "tour_guides"), (name = "travels"), (name = "reviews"),
        (name = "users"), (name = "orders"), (name = "posts", description = "Legacy /items resource")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/city", "/tour_guides/", "/treves", "/travels/search", "/user/login", "/items/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn travel_response_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("TravelResponse"));
        assert!(schemas.contains_key("ErrorBody"));
    }
}
