use std::collections::HashMap;

use time::PrimitiveDateTime;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::Submission;
use crate::db::types::QuestionKind;
use crate::repositories;
use crate::schemas::submission::{
    format_primitive, AnswerResponse, EvaluationResultResponse, SubmissionResponse,
};
use crate::services::scoring::{self, ScoredQuestion};

/// Grace added to the attempt deadline before answer writes are refused,
/// covering clock skew and the client's forced submit at zero.
pub(in crate::api::submissions) const DEADLINE_GRACE_SECONDS: i64 = 60;

pub(in crate::api::submissions) async fn fetch_submission(
    state: &AppState,
    submission_id: &str,
) -> Result<Submission, ApiError> {
    repositories::submissions::find_by_id(state.db(), submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
}

pub(in crate::api::submissions) fn attempt_deadline(
    submission: &Submission,
    time_limit_minutes: Option<i32>,
) -> Option<PrimitiveDateTime> {
    time_limit_minutes
        .map(|minutes| submission.started_at + time::Duration::minutes(i64::from(minutes)))
}

/// Assemble the full submission record: answers and evaluation results in
/// assessment order, plus the per-category breakdown when results exist.
pub(in crate::api::submissions) async fn build_submission_response(
    state: &AppState,
    submission: Submission,
) -> Result<SubmissionResponse, ApiError> {
    let answers = repositories::submissions::list_answers(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;
    let results = repositories::submissions::list_results(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load evaluation results"))?;
    let questions =
        repositories::questions::list_for_assessment(state.db(), &submission.assessment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    let kind_by_question: HashMap<&str, QuestionKind> =
        questions.iter().map(|question| (question.id.as_str(), question.kind)).collect();

    let scored: Vec<ScoredQuestion> = results
        .iter()
        .filter_map(|result| {
            kind_by_question.get(result.question_id.as_str()).map(|kind| ScoredQuestion {
                kind: *kind,
                score: result.score,
                max_score: result.max_score,
            })
        })
        .collect();

    let categories =
        if scored.is_empty() { Vec::new() } else { scoring::aggregate(&scored).categories };

    let percentage = match (submission.total_score, submission.max_score) {
        (Some(total), Some(max)) => Some(scoring::percentage(total, max)),
        _ => None,
    };

    Ok(SubmissionResponse {
        id: submission.id,
        assessment_id: submission.assessment_id,
        participant_id: submission.participant_id,
        status: submission.status,
        total_score: submission.total_score,
        max_score: submission.max_score,
        percentage,
        overall_feedback: submission.overall_feedback,
        started_at: format_primitive(submission.started_at),
        finished_at: submission.finished_at.map(format_primitive),
        answers: answers.into_iter().map(AnswerResponse::from_db).collect(),
        results: results.into_iter().map(EvaluationResultResponse::from_db).collect(),
        categories,
    })
}
