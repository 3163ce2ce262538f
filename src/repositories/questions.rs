use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::db::models::Question;
use crate::db::types::QuestionKind;

const COLUMNS: &str = "\
    id, assessment_id, kind, prompt, options, correct_option, points, \
    evaluation_criteria, position, created_at";

pub(crate) async fn list_for_assessment(
    pool: &PgPool,
    assessment_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE assessment_id = $1 ORDER BY position"
    ))
    .bind(assessment_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub assessment_id: &'a str,
    pub kind: QuestionKind,
    pub prompt: &'a str,
    pub options: Vec<String>,
    pub correct_option: Option<&'a str>,
    pub points: i32,
    pub evaluation_criteria: Option<&'a str>,
    pub position: i32,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create<'e>(
    executor: impl PgExecutor<'e>,
    params: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO questions (
            id, assessment_id, kind, prompt, options, correct_option, points,
            evaluation_criteria, position, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)",
    )
    .bind(params.id)
    .bind(params.assessment_id)
    .bind(params.kind)
    .bind(params.prompt)
    .bind(Json(params.options))
    .bind(params.correct_option)
    .bind(params.points)
    .bind(params.evaluation_criteria)
    .bind(params.position)
    .bind(params.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
