use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentReviewer;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::SubmissionStatus;
use crate::repositories;
use crate::schemas::submission::{SubmissionGrade, SubmissionResponse};

use super::helpers;

/// Replace individual evaluation results with a reviewer's scores, then
/// re-derive the stored total so it stays the sum of per-question scores.
pub(super) async fn grade_submission(
    Path(submission_id): Path<String>,
    CurrentReviewer(reviewer): CurrentReviewer,
    State(state): State<AppState>,
    Json(payload): Json<SubmissionGrade>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let submission = helpers::fetch_submission(&state, &submission_id).await?;
    if submission.status != SubmissionStatus::Completed {
        return Err(ApiError::BadRequest(
            "Only completed submissions can be graded".to_string(),
        ));
    }

    let results = repositories::submissions::list_results(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load evaluation results"))?;
    let max_by_question: HashMap<&str, f64> =
        results.iter().map(|result| (result.question_id.as_str(), result.max_score)).collect();

    for grade in &payload.overrides {
        let Some(max_score) = max_by_question.get(grade.question_id.as_str()) else {
            return Err(ApiError::NotFound(format!(
                "No evaluation result for question {}",
                grade.question_id
            )));
        };
        if grade.score > *max_score {
            return Err(ApiError::BadRequest(format!(
                "Score for question {} cannot exceed max_score ({})",
                grade.question_id, max_score
            )));
        }
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    for grade in &payload.overrides {
        let updated = repositories::submissions::apply_override(
            &mut *tx,
            &submission.id,
            &grade.question_id,
            grade.score,
            grade.feedback.as_deref(),
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to apply grade override"))?;

        if !updated {
            return Err(ApiError::NotFound(format!(
                "No evaluation result for question {}",
                grade.question_id
            )));
        }
    }

    repositories::submissions::recompute_total(
        &mut *tx,
        &submission.id,
        payload.overall_feedback.as_deref(),
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to recompute total score"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        submission_id = %submission.id,
        reviewer_id = %reviewer.id,
        override_count = payload.overrides.len(),
        "Submission regraded"
    );

    let submission = helpers::fetch_submission(&state, &submission_id).await?;
    Ok(Json(helpers::build_submission_response(&state, submission).await?))
}
