use crate::common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use liftlog::infrastructure::repositories::mock::{
    MockRefreshTokenRepository, MockUserRepository,
};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_endpoint() {
    let pool = setup_test_db_or_skip!();

    let state = common::create_test_app_state(pool);
    let app = liftlog::presentation::router::app(state, &common::test_server_settings()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = common::mock_app(MockUserRepository::new(), MockRefreshTokenRepository::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert!(json["paths"]["/api/v1/auth/refresh"].is_object());
}
