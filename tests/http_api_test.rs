// ABOUTME: End-to-end HTTP tests exercising the router with in-process requests
// ABOUTME: Covers auth flows, recipe CRUD, relations, and the shopping-list download
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use plateful::auth::AuthManager;
use plateful::config::ServerConfig;
use plateful::database::Database;
use plateful::routes::{self, ServerResources};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> Router {
    let database = Database::new("sqlite::memory:").await.unwrap();
    let config = ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        jwt_secret: "test-secret".to_owned(),
        jwt_expiry_hours: 24,
    };
    let auth = AuthManager::new(config.jwt_secret.clone(), config.jwt_expiry_hours);
    routes::router(Arc::new(ServerResources::new(database, auth, config)))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let register = json_request(
        "POST",
        "/api/auth/register",
        None,
        json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "first_name": "Test",
            "last_name": "User",
            "password": "correct-horse",
        }),
    );
    let response = app.clone().oneshot(register).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let login = json_request(
        "POST",
        "/api/auth/login",
        None,
        json!({
            "email": format!("{username}@example.com"),
            "password": "correct-horse",
        }),
    );
    let response = app.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    body["jwt_token"].as_str().unwrap().to_owned()
}

async fn create_ingredient(app: &Router, token: &str, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/ingredients",
            Some(token),
            json!({ "name": name, "measurement_unit": "g" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"].as_i64().unwrap()
}

async fn create_recipe(app: &Router, token: &str, name: &str, ingredient_id: i64) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            Some(token),
            json!({
                "name": name,
                "image": "recipes/images/test.png",
                "text": "Instructions",
                "cooking_time": 30,
                "ingredients": [{ "id": ingredient_id, "amount": 100 }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;
    let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app().await;
    register_and_login(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": "alice@example.com",
                "username": "alice2",
                "first_name": "Test",
                "last_name": "User",
                "password": "correct-horse",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = test_app().await;
    register_and_login(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mutations_require_token() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            None,
            json!({
                "name": "Bread",
                "image": "recipes/images/bread.png",
                "text": "Bake",
                "cooking_time": 90,
                "ingredients": [{ "id": 1, "amount": 500 }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/recipes/download_shopping_cart", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recipe_lifecycle() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;
    let flour = create_ingredient(&app, &token, "Flour").await;
    let recipe_id = create_recipe(&app, &token, "Bread", flour).await;

    // Anonymous detail view carries false annotations
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/recipes/{recipe_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Bread");
    assert_eq!(body["author"]["username"], "alice");
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["ingredients"][0]["name"], "Flour");

    // Author updates the recipe
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/recipes/{recipe_id}"),
            Some(&token),
            json!({
                "name": "Sourdough",
                "image": "recipes/images/sourdough.png",
                "text": "Ferment, then bake",
                "cooking_time": 120,
                "ingredients": [{ "id": flour, "amount": 600 }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Sourdough");
    assert_eq!(body["cooking_time"], 120);

    // Author deletes it
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/recipes/{recipe_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get_request(&format!("/api/recipes/{recipe_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_author_may_modify() {
    let app = test_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;
    let flour = create_ingredient(&app, &alice, "Flour").await;
    let recipe_id = create_recipe(&app, &alice, "Bread", flour).await;

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/recipes/{recipe_id}"),
            Some(&bob),
            json!({
                "name": "Hijacked",
                "image": "recipes/images/x.png",
                "text": "No",
                "cooking_time": 1,
                "ingredients": [{ "id": flour, "amount": 1 }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_favorite_flow_over_http() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;
    let flour = create_ingredient(&app, &token, "Flour").await;
    let recipe_id = create_recipe(&app, &token, "Bread", flour).await;

    let uri = format!("/api/recipes/{recipe_id}/favorite");
    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Bread");

    // Second add conflicts
    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Detail view now reports the relation
    let response = app
        .oneshot(get_request(
            &format!("/api/recipes/{recipe_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["is_favorited"], true);
    assert_eq!(body["is_in_shopping_cart"], false);
}

#[tokio::test]
async fn test_shopping_list_download() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;
    let sugar = create_ingredient(&app, &token, "Sugar").await;
    let cake = create_recipe(&app, &token, "Cake", sugar).await;
    let cookies = create_recipe(&app, &token, "Cookies", sugar).await;

    for recipe_id in [&cake, &cookies] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/recipes/{recipe_id}/shopping_cart"),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(get_request("/api/recipes/download_shopping_cart", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("shopping_list.txt"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    // Both recipes use 100g of sugar
    assert!(text.contains("Sugar (g): 200"));
}

#[tokio::test]
async fn test_subscription_flow_over_http() {
    let app = test_app().await;
    let alice = register_and_login(&app, "alice").await;
    register_and_login(&app, "bob").await;

    // Find bob's id through the public listing
    let response = app
        .clone()
        .oneshot(get_request("/api/users", None))
        .await
        .unwrap();
    let body = response_json(response).await;
    let bob_id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "bob")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_owned();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/users/{bob_id}/subscribe"),
            Some(&alice),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get_request("/api/users/subscriptions", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["subscriptions"][0]["username"], "bob");
    assert_eq!(body["subscriptions"][0]["recipes_count"], 0);
}
