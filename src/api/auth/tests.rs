use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn register_login_me_flow() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "student1",
                "email": "student1@example.com",
                "password": "student-pass",
                "role": "participant"
            })),
        ))
        .await
        .expect("register");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["user"]["username"], "student1");
    assert_eq!(created["user"]["role"], "participant");
    assert_eq!(created["token_type"], "bearer");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "email": "student1@example.com",
                "password": "student-pass"
            })),
        ))
        .await
        .expect("login");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let token = body["access_token"].as_str().expect("token").to_string();

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&token), None))
        .await
        .expect("me");

    let status = response.status();
    let me = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {me}");
    assert_eq!(me["email"], "student1@example.com");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "student2",
                "email": "student2@example.com",
                "password": "short"
            })),
        ))
        .await
        .expect("register");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(body["detail"].as_str().unwrap_or("").contains("Password must be at least"));
}

#[tokio::test]
async fn register_conflicts_on_duplicate_email() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_participant(
        ctx.state.db(),
        "existing",
        "existing@example.com",
        "some-password",
    )
    .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "another",
                "email": "existing@example.com",
                "password": "another-pass"
            })),
        ))
        .await
        .expect("register");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_participant(ctx.state.db(), "student3", "student3@example.com", "right-pass")
        .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "email": "student3@example.com",
                "password": "wrong-pass"
            })),
        ))
        .await
        .expect("login");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
