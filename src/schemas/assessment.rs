use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{Assessment, Question};
use crate::db::types::QuestionKind;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct QuestionCreate {
    pub(crate) kind: QuestionKind,
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub(crate) prompt: String,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_option: Option<String>,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, message = "points must be positive"))]
    pub(crate) points: i32,
    #[serde(default)]
    #[serde(alias = "evaluationCriteria")]
    pub(crate) evaluation_criteria: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssessmentCreate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "timeLimit")]
    #[validate(range(min = 1, message = "time_limit_minutes must be positive"))]
    pub(crate) time_limit_minutes: Option<i32>,
    #[validate(length(min = 1, message = "at least one question is required"), nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) prompt: String,
    pub(crate) options: Vec<String>,
    pub(crate) correct_option: Option<String>,
    pub(crate) points: i32,
    pub(crate) evaluation_criteria: Option<String>,
    pub(crate) position: i32,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            kind: question.kind,
            prompt: question.prompt,
            options: question.options.0,
            correct_option: question.correct_option,
            points: question.points,
            evaluation_criteria: question.evaluation_criteria,
            position: question.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) created_by: String,
    pub(crate) creator_username: Option<String>,
    pub(crate) created_at: String,
    pub(crate) questions: Vec<QuestionResponse>,
}

impl AssessmentResponse {
    pub(crate) fn from_db(
        assessment: Assessment,
        creator_username: Option<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: assessment.id,
            title: assessment.title,
            description: assessment.description,
            time_limit_minutes: assessment.time_limit_minutes,
            created_by: assessment.created_by,
            creator_username,
            created_at: format_primitive(assessment.created_at),
            questions: questions.into_iter().map(QuestionResponse::from_db).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) question_count: i64,
    pub(crate) created_at: String,
}

fn default_points() -> i32 {
    1
}
