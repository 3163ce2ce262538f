use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{SubmissionStatus, UserRole};
use crate::repositories;
use crate::schemas::submission::{
    AnswerUpsert, SubmissionResponse, SubmissionStart, SubmissionSummaryResponse,
};
use crate::services::{grading, scoring};

use super::helpers;

pub(super) async fn start_submission(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmissionStart>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let assessment = repositories::assessments::find_by_id(state.db(), &payload.assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assessment"))?;

    if assessment.is_none() {
        return Err(ApiError::NotFound("Assessment not found".to_string()));
    }

    let open = repositories::submissions::find_open_attempt(
        state.db(),
        &payload.assessment_id,
        &user.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to check open attempts"))?;

    if open.is_some() {
        return Err(ApiError::Conflict(
            "An attempt for this assessment is already in progress".to_string(),
        ));
    }

    let now = primitive_now_utc();
    let submission = repositories::submissions::create(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            assessment_id: &payload.assessment_id,
            participant_id: &user.id,
            status: SubmissionStatus::InProgress,
            started_at: now,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create submission"))?;

    tracing::info!(
        submission_id = %submission.id,
        assessment_id = %submission.assessment_id,
        participant_id = %user.id,
        "Attempt started"
    );

    let response = helpers::build_submission_response(&state, submission).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub(super) async fn save_answer(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AnswerUpsert>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let submission = helpers::fetch_submission(&state, &submission_id).await?;
    if submission.participant_id != user.id {
        return Err(ApiError::Forbidden("Access denied"));
    }

    if submission.status != SubmissionStatus::InProgress {
        return Err(ApiError::BadRequest("Submission is no longer accepting answers".to_string()));
    }

    let assessment = repositories::assessments::find_by_id(state.db(), &submission.assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assessment"))?
        .ok_or_else(|| ApiError::Internal("Assessment missing for submission".to_string()))?;

    let now = primitive_now_utc();
    if let Some(deadline) = helpers::attempt_deadline(&submission, assessment.time_limit_minutes) {
        let cutoff = deadline + time::Duration::seconds(helpers::DEADLINE_GRACE_SECONDS);
        if now > cutoff {
            return Err(ApiError::BadRequest("The time limit for this attempt has expired".to_string()));
        }
    }

    let questions =
        repositories::questions::list_for_assessment(state.db(), &submission.assessment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    if !questions.iter().any(|question| question.id == payload.question_id) {
        return Err(ApiError::NotFound("Question not found in this assessment".to_string()));
    }

    repositories::submissions::upsert_answer(
        state.db(),
        &Uuid::new_v4().to_string(),
        &submission.id,
        &payload.question_id,
        &payload.content,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save answer"))?;

    Ok(Json(serde_json::json!({"message": "Answer saved"})))
}

pub(super) async fn finish_submission(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = helpers::fetch_submission(&state, &submission_id).await?;
    if submission.participant_id != user.id {
        return Err(ApiError::Forbidden("Access denied"));
    }

    let now = primitive_now_utc();
    let frozen = repositories::submissions::mark_evaluating(state.db(), &submission.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to freeze submission"))?;
    if !frozen {
        return Err(ApiError::BadRequest(
            "Submission is not in progress and cannot be finished".to_string(),
        ));
    }

    let questions =
        repositories::questions::list_for_assessment(state.db(), &submission.assessment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let answers = repositories::submissions::list_answers(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    let answers_by_question: HashMap<String, String> =
        answers.into_iter().map(|answer| (answer.question_id, answer.content)).collect();

    // One evaluation call at a time, in assessment order. A failed call
    // degrades that question only.
    let evaluated =
        grading::evaluate_questions(state.evaluator(), &questions, &answers_by_question).await;

    let summary = scoring::aggregate(&grading::to_scored(&evaluated));
    let overall = scoring::overall_feedback(summary.percentage);

    let completed_at = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    for result in &evaluated {
        repositories::submissions::insert_result(
            &mut *tx,
            repositories::submissions::CreateEvaluationResult {
                id: &Uuid::new_v4().to_string(),
                submission_id: &submission.id,
                question_id: &result.question_id,
                score: result.score,
                max_score: result.max_score,
                feedback: &result.feedback,
                model_answer: result.model_answer.as_deref(),
                is_correct: result.is_correct,
                is_evaluated: true,
                created_at: completed_at,
                updated_at: completed_at,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store evaluation result"))?;
    }

    repositories::submissions::complete(
        &mut *tx,
        &submission.id,
        summary.total_score,
        summary.max_score,
        overall,
        completed_at,
        completed_at,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to complete submission"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    metrics::counter!("submissions_evaluated_total").increment(1);
    tracing::info!(
        submission_id = %submission.id,
        participant_id = %user.id,
        total_score = summary.total_score,
        max_score = summary.max_score,
        "Submission evaluated"
    );

    let submission = helpers::fetch_submission(&state, &submission_id).await?;
    Ok(Json(helpers::build_submission_response(&state, submission).await?))
}

pub(super) async fn list_my_submissions(
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<SubmissionSummaryResponse>>, ApiError> {
    let limit = page.limit.clamp(1, 500);
    let skip = page.skip.max(0);

    let submissions =
        repositories::submissions::list_by_participant(state.db(), &user.id, skip, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;
    let total_count = repositories::submissions::count_by_participant(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count submissions"))?;

    Ok(Json(PaginatedResponse {
        items: submissions.into_iter().map(SubmissionSummaryResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

pub(super) async fn get_submission(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = helpers::fetch_submission(&state, &submission_id).await?;

    let is_owner = submission.participant_id == user.id;
    let is_reviewer = user.role == UserRole::Reviewer;
    if !is_owner && !is_reviewer {
        return Err(ApiError::Forbidden("Not authorized to view this submission"));
    }

    Ok(Json(helpers::build_submission_response(&state, submission).await?))
}
