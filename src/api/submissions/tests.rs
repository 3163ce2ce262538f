use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::User;
use crate::test_support::{self, TestContext};

async fn seed_assessment(ctx: &TestContext, reviewer: &User) -> serde_json::Value {
    let token = test_support::bearer_token(reviewer, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assessments",
            Some(&token),
            Some(json!({
                "title": "Introduction to AI",
                "time_limit_minutes": 30,
                "questions": [
                    {
                        "kind": "single_answer",
                        "prompt": "Which option is correct?",
                        "options": ["A", "B"],
                        "correct_option": "B",
                        "points": 1
                    },
                    {
                        "kind": "free_text",
                        "prompt": "Explain the ethical considerations in AI for healthcare.",
                        "points": 3,
                        "evaluation_criteria": "Award up to 3 points for coverage and examples."
                    }
                ]
            })),
        ))
        .await
        .expect("create assessment");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    created
}

async fn run_attempt(
    ctx: &TestContext,
    token: &str,
    assessment: &serde_json::Value,
) -> serde_json::Value {
    let assessment_id = assessment["id"].as_str().expect("assessment id");
    let q1 = assessment["questions"][0]["id"].as_str().expect("q1 id");
    let q2 = assessment["questions"][1]["id"].as_str().expect("q2 id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions/start",
            Some(token),
            Some(json!({"assessment_id": assessment_id})),
        ))
        .await
        .expect("start attempt");

    let status = response.status();
    let started = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {started}");
    assert_eq!(started["status"], "in_progress");
    let submission_id = started["id"].as_str().expect("submission id").to_string();

    for (question_id, content) in [(q1, "B"), (q2, "some text")] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                &format!("/api/v1/submissions/{submission_id}/answers"),
                Some(token),
                Some(json!({"question_id": question_id, "content": content})),
            ))
            .await
            .expect("save answer");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/submissions/{submission_id}/finish"),
            Some(token),
            None,
        ))
        .await
        .expect("finish attempt");

    let status = response.status();
    let finished = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {finished}");
    finished
}

// With the evaluation service unreachable, the single-answer question still
// grades locally and the free-text question degrades to a zero score with
// its kind's default max score.
#[tokio::test]
async fn finish_grades_objective_questions_when_evaluator_is_down() {
    let ctx = test_support::setup_test_context().await;

    let reviewer =
        test_support::insert_reviewer(ctx.state.db(), "teacher20", "t20@example.com", "teacher-pass")
            .await;
    let participant = test_support::insert_participant(
        ctx.state.db(),
        "student20",
        "s20@example.com",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&participant, ctx.state.settings());

    let assessment = seed_assessment(&ctx, &reviewer).await;
    let finished = run_attempt(&ctx, &token, &assessment).await;

    assert_eq!(finished["status"], "completed");
    assert_eq!(finished["total_score"], 1.0);
    assert_eq!(finished["max_score"], 4.0);
    assert_eq!(finished["percentage"], 25.0);

    let results = finished["results"].as_array().expect("results");
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["is_correct"], true);
    assert_eq!(results[0]["score"], 1.0);
    assert_eq!(results[0]["max_score"], 1.0);

    assert_eq!(results[1]["score"], 0.0);
    assert_eq!(results[1]["max_score"], 3.0);
    assert!(!results[1]["feedback"].as_str().unwrap_or("").is_empty());
    assert_eq!(results[1]["is_evaluated"], true);

    let categories = finished["categories"].as_array().expect("categories");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["name"], "Single answer");
    assert_eq!(categories[1]["total"], 3.0);

    assert!(finished["overall_feedback"].as_str().unwrap_or("").contains("foundational"));
}

#[tokio::test]
async fn grade_override_recomputes_total() {
    let ctx = test_support::setup_test_context().await;

    let reviewer =
        test_support::insert_reviewer(ctx.state.db(), "teacher21", "t21@example.com", "teacher-pass")
            .await;
    let participant = test_support::insert_participant(
        ctx.state.db(),
        "student21",
        "s21@example.com",
        "student-pass",
    )
    .await;
    let participant_token = test_support::bearer_token(&participant, ctx.state.settings());
    let reviewer_token = test_support::bearer_token(&reviewer, ctx.state.settings());

    let assessment = seed_assessment(&ctx, &reviewer).await;
    let finished = run_attempt(&ctx, &participant_token, &assessment).await;
    let submission_id = finished["id"].as_str().expect("submission id");
    let q2 = assessment["questions"][1]["id"].as_str().expect("q2 id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/submissions/{submission_id}/grade"),
            Some(&reviewer_token),
            Some(json!({
                "overrides": [
                    {"question_id": q2, "score": 3.0, "feedback": "Thorough coverage of the topic."}
                ],
                "overall_feedback": "Re-graded by a reviewer."
            })),
        ))
        .await
        .expect("grade submission");

    let status = response.status();
    let graded = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {graded}");

    assert_eq!(graded["total_score"], 4.0);
    assert_eq!(graded["max_score"], 4.0);
    assert_eq!(graded["percentage"], 100.0);
    assert_eq!(graded["overall_feedback"], "Re-graded by a reviewer.");

    let results = graded["results"].as_array().expect("results");
    // Question 1 stays untouched.
    assert_eq!(results[0]["score"], 1.0);
    assert_eq!(results[0]["overridden"], false);
    assert_eq!(results[1]["score"], 3.0);
    assert_eq!(results[1]["overridden"], true);
    assert_eq!(results[1]["feedback"], "Thorough coverage of the topic.");
}

#[tokio::test]
async fn grade_rejects_score_above_max() {
    let ctx = test_support::setup_test_context().await;

    let reviewer =
        test_support::insert_reviewer(ctx.state.db(), "teacher22", "t22@example.com", "teacher-pass")
            .await;
    let participant = test_support::insert_participant(
        ctx.state.db(),
        "student22",
        "s22@example.com",
        "student-pass",
    )
    .await;
    let participant_token = test_support::bearer_token(&participant, ctx.state.settings());
    let reviewer_token = test_support::bearer_token(&reviewer, ctx.state.settings());

    let assessment = seed_assessment(&ctx, &reviewer).await;
    let finished = run_attempt(&ctx, &participant_token, &assessment).await;
    let submission_id = finished["id"].as_str().expect("submission id");
    let q2 = assessment["questions"][1]["id"].as_str().expect("q2 id");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/submissions/{submission_id}/grade"),
            Some(&reviewer_token),
            Some(json!({
                "overrides": [{"question_id": q2, "score": 99.0}]
            })),
        ))
        .await
        .expect("grade submission");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn participant_cannot_grade_or_view_foreign_submission() {
    let ctx = test_support::setup_test_context().await;

    let reviewer =
        test_support::insert_reviewer(ctx.state.db(), "teacher23", "t23@example.com", "teacher-pass")
            .await;
    let owner = test_support::insert_participant(
        ctx.state.db(),
        "student23",
        "s23@example.com",
        "student-pass",
    )
    .await;
    let outsider = test_support::insert_participant(
        ctx.state.db(),
        "student24",
        "s24@example.com",
        "student-pass",
    )
    .await;
    let owner_token = test_support::bearer_token(&owner, ctx.state.settings());
    let outsider_token = test_support::bearer_token(&outsider, ctx.state.settings());

    let assessment = seed_assessment(&ctx, &reviewer).await;
    let finished = run_attempt(&ctx, &owner_token, &assessment).await;
    let submission_id = finished["id"].as_str().expect("submission id");
    let q2 = assessment["questions"][1]["id"].as_str().expect("q2 id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/submissions/{submission_id}"),
            Some(&outsider_token),
            None,
        ))
        .await
        .expect("get submission");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/submissions/{submission_id}/grade"),
            Some(&outsider_token),
            Some(json!({"overrides": [{"question_id": q2, "score": 1.0}]})),
        ))
        .await
        .expect("grade submission");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_open_attempt_conflicts_and_double_finish_rejected() {
    let ctx = test_support::setup_test_context().await;

    let reviewer =
        test_support::insert_reviewer(ctx.state.db(), "teacher25", "t25@example.com", "teacher-pass")
            .await;
    let participant = test_support::insert_participant(
        ctx.state.db(),
        "student25",
        "s25@example.com",
        "student-pass",
    )
    .await;
    let token = test_support::bearer_token(&participant, ctx.state.settings());

    let assessment = seed_assessment(&ctx, &reviewer).await;
    let assessment_id = assessment["id"].as_str().expect("assessment id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions/start",
            Some(&token),
            Some(json!({"assessment_id": assessment_id})),
        ))
        .await
        .expect("start attempt");
    let started = test_support::read_json(response).await;
    let submission_id = started["id"].as_str().expect("submission id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/submissions/start",
            Some(&token),
            Some(json!({"assessment_id": assessment_id})),
        ))
        .await
        .expect("start duplicate attempt");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/submissions/{submission_id}/finish"),
            Some(&token),
            None,
        ))
        .await
        .expect("finish attempt");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/submissions/{submission_id}/finish"),
            Some(&token),
            None,
        ))
        .await
        .expect("finish attempt again");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reviewer_lists_assessment_submissions_and_analytics_reflect_attempt() {
    let ctx = test_support::setup_test_context().await;

    let reviewer =
        test_support::insert_reviewer(ctx.state.db(), "teacher26", "t26@example.com", "teacher-pass")
            .await;
    let participant = test_support::insert_participant(
        ctx.state.db(),
        "student26",
        "s26@example.com",
        "student-pass",
    )
    .await;
    let participant_token = test_support::bearer_token(&participant, ctx.state.settings());
    let reviewer_token = test_support::bearer_token(&reviewer, ctx.state.settings());

    let assessment = seed_assessment(&ctx, &reviewer).await;
    let assessment_id = assessment["id"].as_str().expect("assessment id");
    run_attempt(&ctx, &participant_token, &assessment).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/assessments/{assessment_id}/submissions"),
            Some(&reviewer_token),
            None,
        ))
        .await
        .expect("list assessment submissions");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["status"], "completed");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/analytics/me",
            Some(&participant_token),
            None,
        ))
        .await
        .expect("analytics");

    let status = response.status();
    let analytics = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {analytics}");
    assert_eq!(analytics["assessments_taken"], 1);
    assert_eq!(analytics["average_score"], 25.0);
    assert_eq!(analytics["recent_submissions"].as_array().map(Vec::len), Some(1));
    assert_eq!(analytics["recent_submissions"][0]["title"], "Introduction to AI");
}
