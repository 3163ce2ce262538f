use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::SubmissionStatus;

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub assessment_id: &'a str,
    pub participant_id: &'a str,
    pub status: SubmissionStatus,
    pub started_at: PrimitiveDateTime,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) struct CreateEvaluationResult<'a> {
    pub id: &'a str,
    pub submission_id: &'a str,
    pub question_id: &'a str,
    pub score: f64,
    pub max_score: f64,
    pub feedback: &'a str,
    pub model_answer: Option<&'a str>,
    pub is_correct: Option<bool>,
    pub is_evaluated: bool,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Debug, FromRow)]
pub(crate) struct RecentSubmissionRow {
    pub(crate) id: String,
    pub(crate) assessment_title: String,
    pub(crate) finished_at: Option<PrimitiveDateTime>,
    pub(crate) total_score: Option<f64>,
    pub(crate) max_score: Option<f64>,
}

#[derive(Debug, FromRow)]
pub(crate) struct ParticipantStats {
    pub(crate) assessments_taken: i64,
    pub(crate) total_score: Option<f64>,
    pub(crate) max_score: Option<f64>,
}
