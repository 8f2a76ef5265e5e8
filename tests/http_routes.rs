use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`
use travel_booking::{app, AppConfig, AppState};

fn router() -> Router {
    app(AppState::in_memory(), AppConfig::DEFAULT_BODY_LIMIT_BYTES)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn create_city(app: &Router, name: &str) -> i64 {
    let (status, body) = post(
        app,
        "/city/create",
        json!({"name": name, "description": "old town", "image_url": null}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_guide(app: &Router, name: &str, city_id: i64) -> i64 {
    let (status, body) = post(
        app,
        "/tour_guide/create",
        json!({"name": name, "experience_years": 3, "contact_info": "+375 29 000", "city_id": city_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

fn travel_body(name: &str, city_id: i64, guide_id: Option<i64>, price: f64, start: &str, end: &str) -> Value {
    json!({
        "name": name,
        "description": "sightseeing",
        "price": price,
        "duration": "7 days",
        "start_date": start,
        "end_date": end,
        "city_id": city_id,
        "guide_id": guide_id,
    })
}

async fn create_travel(app: &Router, body: Value) -> i64 {
    let (status, body) = post(app, "/travel/create", body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_user(app: &Router, name: &str, age: i32) -> i64 {
    let (status, body) = post(app, "/user/create", json!({"name": name, "age": age})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn service_routes_respond() {
    let app = router();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = get(&app, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "travel-booking");

    let (status, body) = get(&app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/travels/search"].is_object());
}

#[tokio::test]
async fn duplicate_city_name_is_rejected() {
    let app = router();
    create_city(&app, "Minsk").await;
    let (status, body) = post(&app, "/city/create", json!({"name": "Minsk", "description": "again"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["detail"], "City with this name already exists.");

    let (_, cities) = get(&app, "/cities").await;
    assert_eq!(cities.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn city_lookup_by_id_and_fragment() {
    let app = router();
    let minsk = create_city(&app, "Minsk").await;
    let brest = create_city(&app, "Brest").await;

    let (status, body) = get(&app, &format!("/city?id={brest}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Brest");

    let (status, body) = get(&app, &format!("/city?id={brest}&filter=MIN")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], minsk);

    let (status, _) = get(&app, "/city?id=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get(&app, "/city").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/city?filter=zzz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn city_update_and_delete() {
    let app = router();
    let minsk = create_city(&app, "Minsk").await;
    create_city(&app, "Brest").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/city/{minsk}"),
        Some(json!({"name": "Brest", "description": "taken"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/city/{minsk}"),
        Some(json!({"name": "Minsk", "description": "capital"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "capital");

    let (status, body) = send(&app, Method::DELETE, &format!("/city/{minsk}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "City deleted successfully");
}

#[tokio::test]
async fn deleting_referenced_city_is_refused() {
    let app = router();
    let city = create_city(&app, "Grodno").await;
    create_guide(&app, "Pavel", city).await;
    let (status, body) = send(&app, Method::DELETE, &format!("/city/{city}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
    let (status, _) = get(&app, &format!("/city?id={city}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tour_guide_embeds_city_and_rejects_unknown_city() {
    let app = router();
    let city = create_city(&app, "Vitebsk").await;
    let guide = create_guide(&app, "Olga", city).await;

    let (status, body) = get(&app, &format!("/tour_guide/{guide}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"]["name"], "Vitebsk");
    assert_eq!(body["city_id"], city);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/tour_guide/{guide}"),
        Some(json!({"name": "Olga", "experience_years": 5, "contact_info": "x", "city_id": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_reference");
    assert_eq!(body["detail"], "City not found.");

    let (_, body) = get(&app, &format!("/tour_guide/{guide}")).await;
    assert_eq!(body["experience_years"], 3);

    let (status, list) = get(&app, "/tour_guides/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn travel_without_guide_serializes_null() {
    let app = router();
    let city = create_city(&app, "Polotsk").await;
    let travel = create_travel(&app, travel_body("Walk", city, None, 50.0, "2025-05-01", "2025-05-08")).await;

    let (status, body) = get(&app, &format!("/travel/{travel}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["guide"].is_null());
    assert!(body["guide_id"].is_null());
    assert_eq!(body["city"]["name"], "Polotsk");
    assert_eq!(body["price"], 50.0);
    assert_eq!(body["start_date"], "2025-05-01");
}

#[tokio::test]
async fn travel_references_are_validated() {
    let app = router();
    let city = create_city(&app, "Mogilev").await;

    let (status, body) = post(&app, "/travel/create", travel_body("Ghost", 42, None, 1.0, "2025-01-01", "2025-01-02")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "City not found.");

    let (status, body) = post(
        &app,
        "/travel/create",
        travel_body("Ghost", city, Some(42), 1.0, "2025-01-01", "2025-01-02"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Tour guide not found.");

    let guide = create_guide(&app, "Anton", city).await;
    let travel = create_travel(
        &app,
        travel_body("Guided", city, Some(guide), 1.0, "2025-01-01", "2025-01-02"),
    )
    .await;
    let (_, body) = get(&app, &format!("/travel/{travel}")).await;
    assert_eq!(body["guide"]["name"], "Anton");
    assert_eq!(body["guide"]["city"]["id"], city);

    let (status, body) = post(
        &app,
        "/travel/create",
        travel_body("Guided", city, None, 1.0, "2025-01-01", "2025-01-02"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn travel_search_filters() {
    let app = router();
    let minsk = create_city(&app, "Minsk").await;
    let brest = create_city(&app, "Brest").await;
    create_travel(&app, travel_body("Cheap", minsk, None, 100.0, "2025-06-01", "2025-06-08")).await;
    create_travel(&app, travel_body("Pricey", minsk, None, 900.0, "2025-07-01", "2025-07-08")).await;
    create_travel(&app, travel_body("Border", brest, None, 300.0, "2025-06-10", "2025-06-17")).await;

    let (status, all) = get(&app, "/travels/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, found) = get(&app, "/travels/search?name_city=minsk&max_price=500").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = found.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Cheap"]);

    let (status, found) = get(&app, "/travels/search?start_date=2025-06-01&end_date=2025-06-30").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 2);

    let (status, body) = get(&app, "/travels/search?name_city=Gomel").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, list) = get(&app, "/treves").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn user_round_trip() {
    let app = router();
    let id = create_user(&app, "Dasha", 88).await;
    let (status, body) = get(&app, &format!("/user/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "name": "Dasha", "age": 88}));

    let (status, body) = post(&app, "/user/create", json!({"name": "Al", "age": 30})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    let (_, users) = get(&app, "/users").await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn login_and_logout() {
    let app = router();
    let id = create_user(&app, "Dasha", 88).await;

    let (status, body) = post(&app, "/user/login", json!({"name": "Dasha", "age": 87})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());

    let (status, body) = post(&app, "/user/logout", json!({"token": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = post(&app, "/user/login", json!({"name": "Dasha", "age": 88})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], id);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 32);

    let (status, body) = post(&app, "/user/logout", json!({"token": token})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, _) = post(&app, "/user/logout", json!({"token": token})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ambiguous_login_is_refused() {
    let app = router();
    create_user(&app, "Twins", 30).await;
    create_user(&app, "Twins", 30).await;
    let (status, _) = post(&app, "/user/login", json!({"name": "Twins", "age": 30})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn orders_and_reviews_embed_relations() {
    let app = router();
    let city = create_city(&app, "Gomel").await;
    let travel = create_travel(&app, travel_body("River", city, None, 80.0, "2025-08-01", "2025-08-03")).await;
    let user = create_user(&app, "Dasha", 88).await;

    let (status, order) = post(&app, "/order/create", json!({"user_id": user, "travel_id": travel})).await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["user"]["name"], "Dasha");
    assert_eq!(order["travel"]["city"]["name"], "Gomel");
    assert!(order["order_date"].is_string());

    let (status, body) = post(&app, "/order/create", json!({"user_id": 999, "travel_id": travel})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User not found.");

    let (status, review) = post(
        &app,
        "/review/create",
        json!({"user_id": user, "travel_id": travel, "rating": 5, "comment": "great"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{review}");
    let review_id = review["id"].as_i64().unwrap();
    let created_at = review["created_at"].clone();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/review/{review_id}"),
        Some(json!({"user_id": user, "travel_id": travel, "rating": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 3);
    assert!(updated["comment"].is_null());
    assert_eq!(updated["created_at"], created_at);

    let (_, reviews) = get(&app, "/reviews").await;
    assert_eq!(reviews.as_array().unwrap().len(), 1);
    let (_, orders) = get(&app, "/orders").await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/travel/{travel}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let order_id = order["id"].as_i64().unwrap();
    let (status, body) = send(&app, Method::DELETE, &format!("/order/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully");
}

#[tokio::test]
async fn legacy_posts() {
    let app = router();
    let author = create_user(&app, "Writer", 40).await;

    let (status, body) = post(&app, "/items/create", json!({"title": "cats", "body": "they run", "creater_id": 77})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_reference");

    let (status, created) = post(
        &app,
        "/items/create",
        json!({"title": "cats", "body": "they run", "creater_id": author}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["author"]["name"], "Writer");
    let id = created["id"].as_i64().unwrap();

    let (status, body) = get(&app, "/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": null}));

    let (status, body) = get(&app, &format!("/search?post_id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "cats");

    let (status, body) = send(&app, Method::PUT, &format!("/items/{id}"), Some(json!({"title": "dogs"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "dogs");
    assert_eq!(body["text"], "they run");

    let (_, items) = get(&app, "/items").await;
    assert_eq!(items.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &format!("/items/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_missing_ids_is_not_found() {
    let app = router();
    for uri in [
        "/city/404",
        "/tour_guide/404",
        "/travel/404",
        "/review/404",
        "/user/404",
        "/order/404",
        "/items/404",
    ] {
        let (status, body) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["code"], "not_found", "{uri}");
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = app(AppState::in_memory(), 16);
    let (status, body) = post(
        &app,
        "/city/create",
        json!({"name": "A very long city name", "description": "padding padding padding"}),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "payload_too_large");
}

#[tokio::test]
async fn malformed_input_answers_with_error_body() {
    let app = router();

    let (status, body) = get(&app, "/travels/search?min_price=cheap").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = post(&app, "/city/create", json!({"name": "Minsk"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert!(body["detail"].as_str().unwrap().contains("description"));

    let (status, body) = get(&app, "/travel/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/user/create")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn non_finite_price_bounds_are_rejected() {
    let app = router();
    let city = create_city(&app, "Lida").await;
    create_travel(&app, travel_body("Castle", city, None, 100.0, "2025-09-01", "2025-09-02")).await;

    for uri in ["/travels/search?min_price=NaN", "/travels/search?max_price=NaN", "/travels/search?max_price=inf"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["code"], "validation_error", "{uri}");
    }

    let (status, _) = get(&app, "/travels/search?min_price=1000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_tour_guide_name_is_rejected() {
    let app = router();
    let city = create_city(&app, "Pinsk").await;
    create_guide(&app, "Olga", city).await;
    let ivan = create_guide(&app, "Ivan", city).await;

    let (status, body) = post(
        &app,
        "/tour_guide/create",
        json!({"name": "Olga", "experience_years": 1, "contact_info": "y", "city_id": city}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["detail"], "Tour guide with this name already exists.");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/tour_guide/{ivan}"),
        Some(json!({"name": "Olga", "experience_years": 2, "contact_info": "z", "city_id": city})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");

    let (_, list) = get(&app, "/tour_guides/").await;
    let names: Vec<&str> = list.as_array().unwrap().iter().map(|g| g["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Olga", "Ivan"]);
}
