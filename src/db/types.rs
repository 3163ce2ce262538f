use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Participant,
    Reviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questionkind", rename_all = "snake_case")]
pub(crate) enum QuestionKind {
    SingleAnswer,
    FreeText,
    CodeSubmission,
    SpokenResponse,
}

impl QuestionKind {
    /// Fallback maximum score used when the evaluation service omits one or
    /// fails entirely. Single-answer questions are worth one point by
    /// default; open-ended kinds carry heavier defaults.
    pub(crate) fn default_max_score(self) -> f64 {
        match self {
            Self::SingleAnswer => 1.0,
            Self::FreeText | Self::SpokenResponse => 3.0,
            Self::CodeSubmission => 5.0,
        }
    }

    pub(crate) fn category_name(self) -> &'static str {
        match self {
            Self::SingleAnswer => "Single answer",
            Self::FreeText => "Free text",
            Self::CodeSubmission => "Code",
            Self::SpokenResponse => "Spoken response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "submissionstatus", rename_all = "snake_case")]
pub(crate) enum SubmissionStatus {
    InProgress,
    Evaluating,
    Completed,
}
