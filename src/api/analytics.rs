use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::repositories;
use crate::schemas::analytics::{AnalyticsResponse, RecentSubmissionResponse};
use crate::services::scoring;

const RECENT_SUBMISSIONS_LIMIT: i64 = 5;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me", get(my_analytics))
}

async fn my_analytics(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let stats = repositories::submissions::participant_stats(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute participant stats"))?;

    if stats.assessments_taken == 0 {
        return Ok(Json(AnalyticsResponse {
            assessments_taken: 0,
            average_score: 0.0,
            recent_submissions: Vec::new(),
        }));
    }

    let average_score = scoring::percentage(
        stats.total_score.unwrap_or(0.0),
        stats.max_score.unwrap_or(0.0),
    );

    let recent = repositories::submissions::recent_completed_by_participant(
        state.db(),
        &user.id,
        RECENT_SUBMISSIONS_LIMIT,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load recent submissions"))?;

    let recent_submissions = recent
        .into_iter()
        .map(|row| {
            let percentage = scoring::percentage(
                row.total_score.unwrap_or(0.0),
                row.max_score.unwrap_or(0.0),
            );
            RecentSubmissionResponse {
                id: row.id,
                title: row.assessment_title,
                date: row.finished_at.map(format_primitive),
                score: row.total_score,
                max_score: row.max_score,
                percentage,
            }
        })
        .collect();

    Ok(Json(AnalyticsResponse {
        assessments_taken: stats.assessments_taken,
        average_score,
        recent_submissions,
    }))
}
