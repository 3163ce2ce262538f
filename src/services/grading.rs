use std::collections::HashMap;

use crate::db::models::Question;
use crate::db::types::QuestionKind;
use crate::services::evaluation::{EvaluationRequest, EvaluationService};
use crate::services::scoring;

/// Everything the pipeline records for one question of a frozen attempt.
#[derive(Debug, Clone)]
pub(crate) struct EvaluatedQuestion {
    pub(crate) question_id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) score: f64,
    pub(crate) max_score: f64,
    pub(crate) feedback: String,
    pub(crate) model_answer: Option<String>,
    pub(crate) is_correct: Option<bool>,
}

/// Evaluate a frozen attempt question by question, in assessment order.
///
/// Single-answer questions grade locally; everything else goes to the
/// external evaluator. The loop is deliberately sequential so one attempt
/// holds at most one evaluation call open at a time; a slow call delays this
/// attempt only. Unanswered questions evaluate as empty answers.
pub(crate) async fn evaluate_questions(
    evaluator: &EvaluationService,
    questions: &[Question],
    answers: &HashMap<String, String>,
) -> Vec<EvaluatedQuestion> {
    let mut evaluated = Vec::with_capacity(questions.len());

    for question in questions {
        let answer = answers.get(&question.id).map(String::as_str).unwrap_or("");

        let result = match question.kind {
            QuestionKind::SingleAnswer => {
                let grade = scoring::auto_grade(question, answer);
                EvaluatedQuestion {
                    question_id: question.id.clone(),
                    kind: question.kind,
                    score: grade.score,
                    max_score: grade.max_score,
                    feedback: if grade.is_correct {
                        "Correct answer.".to_string()
                    } else {
                        "Incorrect answer.".to_string()
                    },
                    model_answer: question.correct_option.clone(),
                    is_correct: Some(grade.is_correct),
                }
            }
            _ => {
                let request = EvaluationRequest::new(question, answer);
                let outcome = evaluator.evaluate(&request).await;
                EvaluatedQuestion {
                    question_id: question.id.clone(),
                    kind: question.kind,
                    score: outcome.score,
                    max_score: outcome.max_score,
                    feedback: outcome.feedback,
                    model_answer: outcome.model_answer,
                    is_correct: None,
                }
            }
        };

        evaluated.push(result);
    }

    evaluated
}

pub(crate) fn to_scored(evaluated: &[EvaluatedQuestion]) -> Vec<scoring::ScoredQuestion> {
    evaluated
        .iter()
        .map(|question| scoring::ScoredQuestion {
            kind: question.kind,
            score: question.score,
            max_score: question.max_score,
        })
        .collect()
}
