use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentReviewer, CurrentUser};
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::api::validation::validate_question;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::assessment::{
    format_primitive, AssessmentCreate, AssessmentResponse, AssessmentSummaryResponse,
};
use crate::schemas::submission::SubmissionSummaryResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assessment).get(list_assessments))
        .route("/:assessment_id", get(get_assessment))
        .route("/:assessment_id/submissions", get(list_assessment_submissions))
}

async fn create_assessment(
    CurrentReviewer(reviewer): CurrentReviewer,
    State(state): State<AppState>,
    Json(payload): Json<AssessmentCreate>,
) -> Result<(StatusCode, Json<AssessmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    for (index, question) in payload.questions.iter().enumerate() {
        validate_question(index, question)?;
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let assessment_id = Uuid::new_v4().to_string();
    let assessment = repositories::assessments::create(
        &mut *tx,
        repositories::assessments::CreateAssessment {
            id: &assessment_id,
            title: &payload.title,
            description: payload.description.as_deref(),
            time_limit_minutes: payload.time_limit_minutes,
            created_by: &reviewer.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create assessment"))?;

    for (position, question) in payload.questions.iter().enumerate() {
        repositories::questions::create(
            &mut *tx,
            repositories::questions::CreateQuestion {
                id: &Uuid::new_v4().to_string(),
                assessment_id: &assessment_id,
                kind: question.kind,
                prompt: &question.prompt,
                options: question.options.clone(),
                correct_option: question.correct_option.as_deref(),
                points: question.points,
                evaluation_criteria: question.evaluation_criteria.as_deref(),
                position: position as i32,
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    let questions = repositories::questions::list_for_assessment(state.db(), &assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    tracing::info!(
        assessment_id = %assessment_id,
        reviewer_id = %reviewer.id,
        question_count = questions.len(),
        "Assessment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse::from_db(assessment, Some(reviewer.username), questions)),
    ))
}

async fn list_assessments(
    CurrentUser(_user): CurrentUser,
    Query(page): Query<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<AssessmentSummaryResponse>>, ApiError> {
    let limit = page.limit.clamp(1, 500);
    let skip = page.skip.max(0);

    let rows = repositories::assessments::list_summaries(state.db(), skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assessments"))?;
    let total_count = repositories::assessments::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count assessments"))?;

    let items = rows
        .into_iter()
        .map(|row| AssessmentSummaryResponse {
            id: row.id,
            title: row.title,
            description: row.description,
            time_limit_minutes: row.time_limit_minutes,
            question_count: row.question_count,
            created_at: format_primitive(row.created_at),
        })
        .collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn get_assessment(
    Path(assessment_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let assessment = repositories::assessments::find_by_id(state.db(), &assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assessment"))?;

    let Some(assessment) = assessment else {
        return Err(ApiError::NotFound("Assessment not found".to_string()));
    };

    let creator_username =
        repositories::users::find_username_by_id(state.db(), &assessment.created_by)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch creator"))?;

    let questions = repositories::questions::list_for_assessment(state.db(), &assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    Ok(Json(AssessmentResponse::from_db(assessment, creator_username, questions)))
}

async fn list_assessment_submissions(
    Path(assessment_id): Path<String>,
    CurrentReviewer(_reviewer): CurrentReviewer,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionSummaryResponse>>, ApiError> {
    let assessment = repositories::assessments::find_by_id(state.db(), &assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assessment"))?;

    if assessment.is_none() {
        return Err(ApiError::NotFound("Assessment not found".to_string()));
    }

    let submissions = repositories::submissions::list_by_assessment(state.db(), &assessment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionSummaryResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
