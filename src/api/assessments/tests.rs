use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

fn sample_assessment() -> serde_json::Value {
    json!({
        "title": "Introduction to AI",
        "description": "Test your knowledge on artificial intelligence basics",
        "time_limit_minutes": 30,
        "questions": [
            {
                "kind": "single_answer",
                "prompt": "Which of the following is a characteristic of machine learning algorithms?",
                "options": ["They can only be supervised", "They improve with experience"],
                "correct_option": "They improve with experience",
                "points": 1
            },
            {
                "kind": "free_text",
                "prompt": "Explain the ethical considerations in developing AI systems for healthcare.",
                "points": 3,
                "evaluation_criteria": "Award 3 points for comprehensive coverage with examples."
            }
        ]
    })
}

#[tokio::test]
async fn reviewer_creates_and_fetches_assessment() {
    let ctx = test_support::setup_test_context().await;

    let reviewer = test_support::insert_reviewer(
        ctx.state.db(),
        "teacher1",
        "teacher1@example.com",
        "teacher-pass",
    )
    .await;
    let token = test_support::bearer_token(&reviewer, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assessments",
            Some(&token),
            Some(sample_assessment()),
        ))
        .await
        .expect("create assessment");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let assessment_id = created["id"].as_str().expect("assessment id").to_string();
    assert_eq!(created["questions"].as_array().map(Vec::len), Some(2));
    assert_eq!(created["questions"][0]["position"], 0);
    assert_eq!(created["questions"][1]["kind"], "free_text");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/assessments",
            Some(&token),
            None,
        ))
        .await
        .expect("list assessments");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    assert_eq!(listed["total_count"], 1);
    assert_eq!(listed["items"][0]["question_count"], 2);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/assessments/{assessment_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get assessment");

    let status = response.status();
    let fetched = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {fetched}");
    assert_eq!(fetched["title"], "Introduction to AI");
    assert_eq!(fetched["creator_username"], "teacher1");
}

#[tokio::test]
async fn participant_cannot_create_assessment() {
    let ctx = test_support::setup_test_context().await;

    let participant = test_support::insert_participant(
        ctx.state.db(),
        "student10",
        "student10@example.com",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&participant, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assessments",
            Some(&token),
            Some(sample_assessment()),
        ))
        .await
        .expect("create assessment");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_rejects_correct_option_outside_options() {
    let ctx = test_support::setup_test_context().await;

    let reviewer = test_support::insert_reviewer(
        ctx.state.db(),
        "teacher2",
        "teacher2@example.com",
        "teacher-pass",
    )
    .await;
    let token = test_support::bearer_token(&reviewer, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assessments",
            Some(&token),
            Some(json!({
                "title": "Broken",
                "questions": [
                    {
                        "kind": "single_answer",
                        "prompt": "Pick one",
                        "options": ["A", "B"],
                        "correct_option": "C"
                    }
                ]
            })),
        ))
        .await
        .expect("create assessment");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(body["detail"].as_str().unwrap_or("").contains("correct option"));
}

#[tokio::test]
async fn create_requires_at_least_one_question() {
    let ctx = test_support::setup_test_context().await;

    let reviewer = test_support::insert_reviewer(
        ctx.state.db(),
        "teacher3",
        "teacher3@example.com",
        "teacher-pass",
    )
    .await;
    let token = test_support::bearer_token(&reviewer, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assessments",
            Some(&token),
            Some(json!({"title": "Empty", "questions": []})),
        ))
        .await
        .expect("create assessment");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
