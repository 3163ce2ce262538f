use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{EvaluationResult, Submission, SubmissionAnswer};
use crate::db::types::SubmissionStatus;
use crate::services::scoring::CategoryScore;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionStart {
    #[serde(alias = "assessmentId")]
    pub(crate) assessment_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerUpsert {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(default)]
    pub(crate) content: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct GradeOverride {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[validate(range(min = 0.0, message = "score must be non-negative"))]
    pub(crate) score: f64,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionGrade {
    #[validate(length(min = 1, message = "at least one override is required"), nested)]
    pub(crate) overrides: Vec<GradeOverride>,
    #[serde(default)]
    #[serde(alias = "overallFeedback")]
    pub(crate) overall_feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) question_id: String,
    pub(crate) content: String,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: SubmissionAnswer) -> Self {
        Self { question_id: answer.question_id, content: answer.content }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluationResultResponse {
    pub(crate) question_id: String,
    pub(crate) score: f64,
    pub(crate) max_score: f64,
    pub(crate) feedback: String,
    pub(crate) model_answer: Option<String>,
    pub(crate) is_correct: Option<bool>,
    pub(crate) is_evaluated: bool,
    pub(crate) overridden: bool,
}

impl EvaluationResultResponse {
    pub(crate) fn from_db(result: EvaluationResult) -> Self {
        Self {
            question_id: result.question_id,
            score: result.score,
            max_score: result.max_score,
            feedback: result.feedback,
            model_answer: result.model_answer,
            is_correct: result.is_correct,
            is_evaluated: result.is_evaluated,
            overridden: result.overridden,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) participant_id: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) total_score: Option<f64>,
    pub(crate) max_score: Option<f64>,
    pub(crate) percentage: Option<f64>,
    pub(crate) overall_feedback: Option<String>,
    pub(crate) started_at: String,
    pub(crate) finished_at: Option<String>,
    pub(crate) answers: Vec<AnswerResponse>,
    pub(crate) results: Vec<EvaluationResultResponse>,
    pub(crate) categories: Vec<CategoryScore>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionSummaryResponse {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) participant_id: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) total_score: Option<f64>,
    pub(crate) max_score: Option<f64>,
    pub(crate) started_at: String,
    pub(crate) finished_at: Option<String>,
}

impl SubmissionSummaryResponse {
    pub(crate) fn from_db(submission: Submission) -> Self {
        Self {
            id: submission.id,
            assessment_id: submission.assessment_id,
            participant_id: submission.participant_id,
            status: submission.status,
            total_score: submission.total_score,
            max_score: submission.max_score,
            started_at: format_primitive(submission.started_at),
            finished_at: submission.finished_at.map(format_primitive),
        }
    }
}
