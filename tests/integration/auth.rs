use crate::common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use liftlog::infrastructure::repositories::mock::{
    MockRefreshTokenRepository, MockUserRepository,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const EMAIL: &str = "ada@example.com";

fn setup() -> (Router, MockRefreshTokenRepository) {
    let users = MockUserRepository::new().with_user(common::test_user(EMAIL));
    let tokens = MockRefreshTokenRepository::new();
    (common::mock_app(users, tokens.clone()), tokens)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": EMAIL, "password": common::TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    common::body_json(response).await
}

async fn refresh(app: &Router, refresh_token: &str) -> axum::response::Response {
    app.clone()
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_login_success() {
    let (app, tokens) = setup();

    let json = login(&app).await;

    assert_eq!(json["data"]["type"], "auth-tokens");
    assert!(json["data"]["attributes"]["accessToken"].is_string());
    assert!(json["data"]["attributes"]["refreshToken"].is_string());
    assert_eq!(json["data"]["attributes"]["tokenType"], "Bearer");
    assert_eq!(json["data"]["attributes"]["expiresIn"], 15 * 60);
    assert_eq!(tokens.all().len(), 1);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, tokens) = setup();

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": EMAIL, "password": "not-the-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = common::body_json(response).await;
    assert_eq!(json["errors"][0]["status"], "401");
    assert_eq!(json["errors"][0]["detail"], "Invalid email or password");
    assert!(tokens.all().is_empty());
}

#[tokio::test]
async fn test_login_invalid_email_format() {
    let (app, _) = setup();

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "not-an-email", "password": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = common::body_json(response).await;
    assert_eq!(json["errors"][0]["source"]["parameter"], "email");
}

#[tokio::test]
async fn test_malformed_json_is_unprocessable() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/login")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = common::body_json(response).await;
    assert_eq!(json["errors"][0]["source"]["parameter"], "body");
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let (app, tokens) = setup();
    let session = login(&app).await;
    let old_refresh = session["data"]["attributes"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = refresh(&app, &old_refresh).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    let new_refresh = json["data"]["attributes"]["refreshToken"].as_str().unwrap();
    assert_ne!(new_refresh, old_refresh);
    assert_ne!(
        json["data"]["attributes"]["accessToken"],
        session["data"]["attributes"]["accessToken"]
    );

    let stored = tokens.all();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.iter().filter(|t| t.revoked).count(), 1);
}

#[tokio::test]
async fn test_refresh_replay_is_rejected() {
    let (app, _) = setup();
    let session = login(&app).await;
    let refresh_token = session["data"]["attributes"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    assert_eq!(refresh(&app, &refresh_token).await.status(), StatusCode::OK);

    let replay = refresh(&app, &refresh_token).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let json = common::body_json(replay).await;
    assert_eq!(json["errors"][0]["detail"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let (app, _) = setup();

    let response = refresh(&app, "never-issued").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_blank_token_is_unprocessable() {
    let (app, _) = setup();

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            json!({ "refresh_token": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = common::body_json(response).await;
    assert_eq!(json["errors"][0]["source"]["parameter"], "refresh_token");
}

#[tokio::test]
async fn test_me_returns_token_identity() {
    let (app, _) = setup();
    let session = login(&app).await;
    let access_token = session["data"]["attributes"]["accessToken"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["data"]["type"], "current-user");
    assert_eq!(json["data"]["attributes"]["email"], EMAIL);
    assert_eq!(json["data"]["attributes"]["role"], "user");
}

#[tokio::test]
async fn test_me_without_token() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_refresh_token_as_bearer() {
    let (app, _) = setup();
    let session = login(&app).await;
    let refresh_token = session["data"]["attributes"]["refreshToken"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {}", refresh_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = common::body_json(response).await;
    assert_eq!(json["errors"][0]["detail"], "Invalid or expired token");
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let (app, tokens) = setup();
    let session = login(&app).await;
    let refresh_token = session["data"]["attributes"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/logout",
            json!({ "refresh_token": refresh_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(tokens.all()[0].revoked);

    // Revoked tokens no longer refresh
    assert_eq!(
        refresh(&app, &refresh_token).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_logout_unknown_token_is_no_content() {
    let (app, _) = setup();

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/logout",
            json!({ "refresh_token": "never-issued" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
