use sqlx::PgPool;

use crate::db::models::{EvaluationResult, Submission, SubmissionAnswer};
use crate::db::types::SubmissionStatus;

use super::types::{ParticipantStats, RecentSubmissionRow};

const COLUMNS: &str = "\
    id, assessment_id, participant_id, status, total_score, max_score, \
    overall_feedback, started_at, finished_at, created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_open_attempt(
    pool: &PgPool,
    assessment_id: &str,
    participant_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE assessment_id = $1 AND participant_id = $2 AND status = $3"
    ))
    .bind(assessment_id)
    .bind(participant_id)
    .bind(SubmissionStatus::InProgress)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_participant(
    pool: &PgPool,
    participant_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE participant_id = $1
         ORDER BY finished_at DESC NULLS FIRST, created_at DESC
         OFFSET $2 LIMIT $3"
    ))
    .bind(participant_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_participant(
    pool: &PgPool,
    participant_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions WHERE participant_id = $1")
        .bind(participant_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_by_assessment(
    pool: &PgPool,
    assessment_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions
         WHERE assessment_id = $1
         ORDER BY finished_at DESC NULLS FIRST, created_at DESC"
    ))
    .bind(assessment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_answers(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<SubmissionAnswer>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionAnswer>(
        "SELECT sa.id, sa.submission_id, sa.question_id, sa.content, sa.updated_at
         FROM submission_answers sa
         JOIN questions q ON q.id = sa.question_id
         WHERE sa.submission_id = $1
         ORDER BY q.position",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_results(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<EvaluationResult>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationResult>(
        "SELECT er.id, er.submission_id, er.question_id, er.score, er.max_score, er.feedback,
                er.model_answer, er.is_correct, er.is_evaluated, er.overridden,
                er.created_at, er.updated_at
         FROM evaluation_results er
         JOIN questions q ON q.id = er.question_id
         WHERE er.submission_id = $1
         ORDER BY q.position",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn recent_completed_by_participant(
    pool: &PgPool,
    participant_id: &str,
    limit: i64,
) -> Result<Vec<RecentSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, RecentSubmissionRow>(
        "SELECT s.id, a.title AS assessment_title, s.finished_at, s.total_score, s.max_score
         FROM submissions s
         JOIN assessments a ON a.id = s.assessment_id
         WHERE s.participant_id = $1 AND s.status = $2
         ORDER BY s.finished_at DESC
         LIMIT $3",
    )
    .bind(participant_id)
    .bind(SubmissionStatus::Completed)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn participant_stats(
    pool: &PgPool,
    participant_id: &str,
) -> Result<ParticipantStats, sqlx::Error> {
    sqlx::query_as::<_, ParticipantStats>(
        "SELECT COUNT(*) AS assessments_taken,
                SUM(total_score) AS total_score,
                SUM(max_score) AS max_score
         FROM submissions
         WHERE participant_id = $1 AND status = $2",
    )
    .bind(participant_id)
    .bind(SubmissionStatus::Completed)
    .fetch_one(pool)
    .await
}
