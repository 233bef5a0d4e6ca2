//! End-to-end HTTP walkthrough of the marketplace: registration, login,
//! wallet management, listing, browsing, purchase settlement, and history.
//!
//! Runs against the in-memory store through the full Actix stack, including
//! session middleware, so these tests exercise exactly what a browser client
//! sees.

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::{json, Value};

use rendermart_backend::inbound::http::health::HealthState;
use rendermart_backend::server::{build_app, build_state, AppDependencies, ServerConfig};

fn test_config() -> ServerConfig {
    ServerConfig::new(
        Key::generate(),
        false,
        SameSite::Lax,
        "127.0.0.1:0".parse().expect("loopback addr"),
    )
}

async fn spawn_app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let config = test_config();
    let http_state = build_state(&config);
    test::init_service(build_app(AppDependencies {
        health_state: web::Data::new(HealthState::new()),
        http_state,
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }))
    .await
}

async fn register<S>(app: &S, email: &str)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({ "email": email, "password": "hunter2" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "User registered successfully");
}

async fn login<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": email, "password": "hunter2" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Login successful");
    cookie
}

async fn get_json<S>(app: &S, uri: &str, cookie: &Cookie<'static>) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
    test::read_body_json(res).await
}

async fn post_json<S>(
    app: &S,
    uri: &str,
    cookie: &Cookie<'static>,
    payload: Value,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(payload)
            .to_request(),
    )
    .await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}

/// Seed an account with one listed item and return the session cookie and
/// listed item id.
async fn seed_listing<S>(app: &S, seller_email: &str, price: u32) -> (Cookie<'static>, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    register(app, seller_email).await;
    let cookie = login(app, seller_email).await;

    let (status, body) = post_json(
        app,
        "/api/wallet",
        &cookie,
        json!({ "image_url": "https://img.example/render.png" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image added to wallet");

    let wallet = get_json(app, "/api/wallet", &cookie).await;
    let item_id = wallet[0]["id"].clone();

    let (status, body) = post_json(
        app,
        "/api/wallet/list",
        &cookie,
        json!({ "image_id": item_id, "price": price }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Card successfully listed for sale.");

    (cookie, item_id)
}

#[actix_web::test]
async fn purchase_settles_balances_ownership_and_history() {
    let app = spawn_app().await;
    let (seller_cookie, item_id) = seed_listing(&app, "seller@example.com", 100).await;

    register(&app, "buyer@example.com").await;
    let buyer_cookie = login(&app, "buyer@example.com").await;

    // Browsing is public: no cookie needed.
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/marketplace").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let listings: Value = test::read_body_json(res).await;
    assert_eq!(listings.as_array().map(Vec::len), Some(1));
    assert_eq!(listings[0]["owner_email"], "seller@example.com");
    assert_eq!(listings[0]["status"], "listed");

    let (status, body) = post_json(
        &app,
        "/api/marketplace/buy",
        &buyer_cookie,
        json!({ "image_id": item_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Purchase successful");
    assert_eq!(body["price"], "100");

    // Value is conserved: 500 - 100 and 500 + 100.
    let buyer_balance = get_json(&app, "/api/user-balance", &buyer_cookie).await;
    assert_eq!(buyer_balance["balance"], "400");
    let seller_balance = get_json(&app, "/api/user-balance", &seller_cookie).await;
    assert_eq!(seller_balance["balance"], "600");

    // The item moved to the buyer's wallet, delisted with price reset.
    let buyer_wallet = get_json(&app, "/api/wallet", &buyer_cookie).await;
    assert_eq!(buyer_wallet.as_array().map(Vec::len), Some(1));
    assert_eq!(buyer_wallet[0]["id"], item_id);
    assert_eq!(buyer_wallet[0]["status"], "withdrawn");
    assert_eq!(buyer_wallet[0]["price"], "0");
    let seller_wallet = get_json(&app, "/api/wallet", &seller_cookie).await;
    assert_eq!(seller_wallet.as_array().map(Vec::len), Some(0));

    // The sale shows up in the seller's history with the buyer's email.
    let history = get_json(&app, "/api/history", &seller_cookie).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["buyer_name"], "buyer@example.com");
    assert_eq!(history[0]["price"], "100");

    // The listing is gone, so a second purchase fails.
    let (status, body) = post_json(
        &app,
        "/api/marketplace/buy",
        &buyer_cookie,
        json!({ "image_id": item_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Item not available or already sold");
}

#[actix_web::test]
async fn self_purchase_is_forbidden() {
    let app = spawn_app().await;
    let (seller_cookie, item_id) = seed_listing(&app, "seller@example.com", 50).await;

    let (status, body) = post_json(
        &app,
        "/api/marketplace/buy",
        &seller_cookie,
        json!({ "image_id": item_id }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Cannot purchase your own item");

    // Nothing changed.
    let balance = get_json(&app, "/api/user-balance", &seller_cookie).await;
    assert_eq!(balance["balance"], "500");
}

#[actix_web::test]
async fn insufficient_funds_rejects_without_side_effects() {
    let app = spawn_app().await;
    let (_, item_id) = seed_listing(&app, "seller@example.com", 900).await;

    register(&app, "buyer@example.com").await;
    let buyer_cookie = login(&app, "buyer@example.com").await;

    let (status, body) = post_json(
        &app,
        "/api/marketplace/buy",
        &buyer_cookie,
        json!({ "image_id": item_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient funds to purchase this item");

    let balance = get_json(&app, "/api/user-balance", &buyer_cookie).await;
    assert_eq!(balance["balance"], "500");

    // Still listed for someone who can afford it.
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/marketplace").to_request(),
    )
    .await;
    let listings: Value = test::read_body_json(res).await;
    assert_eq!(listings.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn withdrawn_item_cannot_be_bought() {
    let app = spawn_app().await;
    let (seller_cookie, item_id) = seed_listing(&app, "seller@example.com", 75).await;

    let (status, body) = post_json(
        &app,
        "/api/wallet/withdraw",
        &seller_cookie,
        json!({ "image_id": item_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image successfully withdrawn from sale.");

    register(&app, "buyer@example.com").await;
    let buyer_cookie = login(&app, "buyer@example.com").await;
    let (status, body) = post_json(
        &app,
        "/api/marketplace/buy",
        &buyer_cookie,
        json!({ "image_id": item_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Item not available or already sold");
}

#[actix_web::test]
async fn listing_someone_elses_item_is_not_found() {
    let app = spawn_app().await;
    let (_, item_id) = seed_listing(&app, "seller@example.com", 75).await;

    register(&app, "intruder@example.com").await;
    let intruder_cookie = login(&app, "intruder@example.com").await;
    let (status, body) = post_json(
        &app,
        "/api/wallet/list",
        &intruder_cookie,
        json!({ "image_id": item_id, "price": 10 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Card not found or unauthorized.");
}

#[actix_web::test]
async fn creating_an_image_as_listed_is_rejected() {
    let app = spawn_app().await;
    register(&app, "seller@example.com").await;
    let cookie = login(&app, "seller@example.com").await;

    // Listed items carry a positive price set at listing time; creating one
    // directly would surface a free listing, so the request fails.
    let (status, body) = post_json(
        &app,
        "/api/wallet",
        &cookie,
        json!({ "image_url": "https://img.example/render.png", "status": "listed" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message string").contains("listed"));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/marketplace").to_request(),
    )
    .await;
    let listings: Value = test::read_body_json(res).await;
    assert_eq!(listings.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn non_positive_listing_price_is_rejected() {
    let app = spawn_app().await;
    register(&app, "seller@example.com").await;
    let cookie = login(&app, "seller@example.com").await;

    post_json(
        &app,
        "/api/wallet",
        &cookie,
        json!({ "image_url": "https://img.example/render.png" }),
    )
    .await;
    let wallet = get_json(&app, "/api/wallet", &cookie).await;
    let item_id = wallet[0]["id"].clone();

    let (status, _) = post_json(
        &app,
        "/api/wallet/list",
        &cookie,
        json!({ "image_id": item_id, "price": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn auth_gates_and_messages() {
    let app = spawn_app().await;

    // Protected routes without a session.
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/wallet").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Authentication required");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/check-auth").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Not authenticated");

    // Unknown user, then wrong password.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "ghost@example.com", "password": "hunter2" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "User not found");

    register(&app, "alice@example.com").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "alice@example.com", "password": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Incorrect password");

    // Duplicate registration.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({ "email": "alice@example.com", "password": "hunter2" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // check-auth with a session returns the profile; logout drops it.
    let cookie = login(&app, "alice@example.com").await;
    let body = get_json(&app, "/api/check-auth", &cookie).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["balance"], "500");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = post_json(&app, "/api/logout", &cookie, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");
}

#[actix_web::test]
async fn malformed_body_gets_the_json_error_envelope() {
    let app = spawn_app().await;

    // Missing required field.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({ "email": "alice@example.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["message"]
        .as_str()
        .expect("message string")
        .starts_with("invalid request body"));

    // Body that is not JSON at all.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .insert_header(("content-type", "application/json"))
            .set_payload("not json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["message"].as_str().is_some());
}

#[actix_web::test]
async fn manual_history_entry_round_trips() {
    let app = spawn_app().await;
    register(&app, "seller@example.com").await;
    let cookie = login(&app, "seller@example.com").await;

    let (status, body) = post_json(
        &app,
        "/api/history",
        &cookie,
        json!({
            "image_url": "https://img.example/offline-sale.png",
            "price": 25,
            "buyer_name": "walk-in customer",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sale successfully added to history.");

    let history = get_json(&app, "/api/history", &cookie).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["buyer_name"], "walk-in customer");
    assert_eq!(history[0]["image_url"], "https://img.example/offline-sale.png");
}
