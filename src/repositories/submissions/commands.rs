use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

use super::types::{CreateEvaluationResult, CreateSubmission};

const COLUMNS: &str = "\
    id, assessment_id, participant_id, status, total_score, max_score, \
    overall_feedback, started_at, finished_at, created_at, updated_at";

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, assessment_id, participant_id, status, started_at, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.assessment_id)
    .bind(params.participant_id)
    .bind(params.status)
    .bind(params.started_at)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn upsert_answer(
    pool: &PgPool,
    id: &str,
    submission_id: &str,
    question_id: &str,
    content: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO submission_answers (id, submission_id, question_id, content, updated_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (submission_id, question_id)
         DO UPDATE SET content = EXCLUDED.content, updated_at = EXCLUDED.updated_at",
    )
    .bind(id)
    .bind(submission_id)
    .bind(question_id)
    .bind(content)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Freeze the attempt for evaluation. Guarded on the current status so a
/// concurrent finish call cannot run the pipeline twice.
pub(crate) async fn mark_evaluating(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE submissions SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
    )
    .bind(SubmissionStatus::Evaluating)
    .bind(now)
    .bind(id)
    .bind(SubmissionStatus::InProgress)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn insert_result<'e>(
    executor: impl PgExecutor<'e>,
    params: CreateEvaluationResult<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO evaluation_results (
            id, submission_id, question_id, score, max_score, feedback, model_answer,
            is_correct, is_evaluated, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)",
    )
    .bind(params.id)
    .bind(params.submission_id)
    .bind(params.question_id)
    .bind(params.score)
    .bind(params.max_score)
    .bind(params.feedback)
    .bind(params.model_answer)
    .bind(params.is_correct)
    .bind(params.is_evaluated)
    .bind(params.created_at)
    .bind(params.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn complete<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    total_score: f64,
    max_score: f64,
    overall_feedback: &str,
    finished_at: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions
         SET status = $1,
             total_score = $2,
             max_score = $3,
             overall_feedback = $4,
             finished_at = $5,
             updated_at = $6
         WHERE id = $7",
    )
    .bind(SubmissionStatus::Completed)
    .bind(total_score)
    .bind(max_score)
    .bind(overall_feedback)
    .bind(finished_at)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn apply_override<'e>(
    executor: impl PgExecutor<'e>,
    submission_id: &str,
    question_id: &str,
    score: f64,
    feedback: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE evaluation_results
         SET score = $1,
             feedback = COALESCE($2, feedback),
             is_evaluated = TRUE,
             overridden = TRUE,
             updated_at = $3
         WHERE submission_id = $4 AND question_id = $5",
    )
    .bind(score)
    .bind(feedback)
    .bind(now)
    .bind(submission_id)
    .bind(question_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Re-derive the stored total from the per-question results. Keeps the
/// invariant total_score == SUM(evaluation_results.score) after a regrade.
pub(crate) async fn recompute_total<'e>(
    executor: impl PgExecutor<'e>,
    submission_id: &str,
    overall_feedback: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions
         SET total_score = (
                 SELECT COALESCE(SUM(score), 0)
                 FROM evaluation_results
                 WHERE submission_id = $1
             ),
             overall_feedback = COALESCE($2, overall_feedback),
             updated_at = $3
         WHERE id = $1",
    )
    .bind(submission_id)
    .bind(overall_feedback)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}
