use sqlx::{FromRow, PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Assessment;

const COLUMNS: &str =
    "id, title, description, time_limit_minutes, created_by, created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Assessment>, sqlx::Error> {
    sqlx::query_as::<_, Assessment>(&format!("SELECT {COLUMNS} FROM assessments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, FromRow)]
pub(crate) struct AssessmentSummaryRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) question_count: i64,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn list_summaries(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<AssessmentSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, AssessmentSummaryRow>(
        "SELECT a.id, a.title, a.description, a.time_limit_minutes,
                COUNT(q.id) AS question_count, a.created_at
         FROM assessments a
         LEFT JOIN questions q ON q.assessment_id = a.id
         GROUP BY a.id
         ORDER BY a.created_at DESC
         OFFSET $1 LIMIT $2",
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM assessments").fetch_one(pool).await
}

pub(crate) struct CreateAssessment<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub time_limit_minutes: Option<i32>,
    pub created_by: &'a str,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create<'e>(
    executor: impl PgExecutor<'e>,
    params: CreateAssessment<'_>,
) -> Result<Assessment, sqlx::Error> {
    sqlx::query_as::<_, Assessment>(&format!(
        "INSERT INTO assessments (
            id, title, description, time_limit_minutes, created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.time_limit_minutes)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}
