use serde::Serialize;

use crate::db::models::Question;
use crate::db::types::QuestionKind;

/// Deterministic grade for a single-answer question.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AutoGrade {
    pub(crate) is_correct: bool,
    pub(crate) score: f64,
    pub(crate) max_score: f64,
}

/// Exact, case-sensitive comparison against the stored correct option. No
/// trimming or normalisation: the stored option strings are the canonical
/// answer values the client submits back.
pub(crate) fn auto_grade(question: &Question, answer: &str) -> AutoGrade {
    let correct = question.correct_option.as_deref().map(|option| option == answer).unwrap_or(false);
    let points = f64::from(question.points);

    AutoGrade { is_correct: correct, score: if correct { points } else { 0.0 }, max_score: points }
}

/// One question's contribution to the aggregate, paired with its kind so
/// results can be bucketed by category.
#[derive(Debug, Clone)]
pub(crate) struct ScoredQuestion {
    pub(crate) kind: QuestionKind,
    pub(crate) score: f64,
    pub(crate) max_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct CategoryScore {
    pub(crate) name: &'static str,
    pub(crate) score: f64,
    pub(crate) total: f64,
    pub(crate) question_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ScoreSummary {
    pub(crate) total_score: f64,
    pub(crate) max_score: f64,
    pub(crate) percentage: f64,
    pub(crate) categories: Vec<CategoryScore>,
}

const CATEGORY_ORDER: [QuestionKind; 4] = [
    QuestionKind::SingleAnswer,
    QuestionKind::FreeText,
    QuestionKind::CodeSubmission,
    QuestionKind::SpokenResponse,
];

/// Pure fold over per-question results. Running it twice over the same list
/// yields identical totals.
pub(crate) fn aggregate(results: &[ScoredQuestion]) -> ScoreSummary {
    let total_score: f64 = results.iter().map(|result| result.score).sum();
    let max_score: f64 = results.iter().map(|result| result.max_score).sum();

    let categories = CATEGORY_ORDER
        .iter()
        .filter_map(|kind| {
            let bucket: Vec<&ScoredQuestion> =
                results.iter().filter(|result| result.kind == *kind).collect();
            if bucket.is_empty() {
                return None;
            }
            Some(CategoryScore {
                name: kind.category_name(),
                score: bucket.iter().map(|result| result.score).sum(),
                total: bucket.iter().map(|result| result.max_score).sum(),
                question_count: bucket.len(),
            })
        })
        .collect();

    ScoreSummary { total_score, max_score, percentage: percentage(total_score, max_score), categories }
}

/// Guard the empty-assessment edge: an attempt with no scorable points is
/// reported as 0%, not NaN.
pub(crate) fn percentage(total_score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        0.0
    } else {
        total_score / max_score * 100.0
    }
}

/// Qualitative banding of the overall result. The threshold boundaries are
/// the contract; the wording is presentation.
pub(crate) fn overall_feedback(percentage: f64) -> &'static str {
    if percentage >= 85.0 {
        "Excellent work. You demonstrated a strong command of the material across all question types."
    } else if percentage >= 70.0 {
        "Good work. You have a solid grasp of the material; review the questions where you lost points."
    } else if percentage >= 50.0 {
        "You showed a basic understanding of the material. Revisit the core concepts and practice with more hands-on examples."
    } else {
        "You may need to revisit the foundational concepts before moving on to more advanced topics."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use sqlx::types::Json;

    fn single_answer_question(correct: &str, points: i32) -> Question {
        Question {
            id: "q1".to_string(),
            assessment_id: "a1".to_string(),
            kind: QuestionKind::SingleAnswer,
            prompt: "Pick one".to_string(),
            options: Json(vec!["A".to_string(), "B".to_string()]),
            correct_option: Some(correct.to_string()),
            points,
            evaluation_criteria: None,
            position: 0,
            created_at: primitive_now_utc(),
        }
    }

    #[test]
    fn auto_grade_awards_full_points_on_exact_match() {
        let question = single_answer_question("B", 2);
        let grade = auto_grade(&question, "B");
        assert!(grade.is_correct);
        assert_eq!(grade.score, 2.0);
        assert_eq!(grade.max_score, 2.0);
    }

    #[test]
    fn auto_grade_is_case_sensitive() {
        let question = single_answer_question("B", 1);
        let grade = auto_grade(&question, "b");
        assert!(!grade.is_correct);
        assert_eq!(grade.score, 0.0);
        assert_eq!(grade.max_score, 1.0);
    }

    #[test]
    fn auto_grade_scores_zero_on_mismatch() {
        let question = single_answer_question("B", 3);
        let grade = auto_grade(&question, "A");
        assert_eq!(grade.score, 0.0);
        assert_eq!(grade.max_score, 3.0);
    }

    #[test]
    fn aggregate_sums_scores_and_buckets_by_kind() {
        let results = vec![
            ScoredQuestion { kind: QuestionKind::SingleAnswer, score: 1.0, max_score: 1.0 },
            ScoredQuestion { kind: QuestionKind::FreeText, score: 2.0, max_score: 3.0 },
            ScoredQuestion { kind: QuestionKind::FreeText, score: 1.0, max_score: 3.0 },
        ];

        let summary = aggregate(&results);
        assert_eq!(summary.total_score, 4.0);
        assert_eq!(summary.max_score, 7.0);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].name, "Single answer");
        assert_eq!(summary.categories[1].score, 3.0);
        assert_eq!(summary.categories[1].total, 6.0);
        assert_eq!(summary.categories[1].question_count, 2);
    }

    #[test]
    fn aggregate_omits_empty_categories() {
        let results =
            vec![ScoredQuestion { kind: QuestionKind::CodeSubmission, score: 5.0, max_score: 5.0 }];
        let summary = aggregate(&results);
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.categories[0].name, "Code");
    }

    #[test]
    fn aggregate_is_idempotent() {
        let results = vec![
            ScoredQuestion { kind: QuestionKind::SingleAnswer, score: 1.0, max_score: 1.0 },
            ScoredQuestion { kind: QuestionKind::CodeSubmission, score: 2.5, max_score: 5.0 },
        ];

        let first = aggregate(&results);
        let second = aggregate(&results);
        assert_eq!(first.total_score, second.total_score);
        assert_eq!(first.max_score, second.max_score);
        assert_eq!(first.percentage, second.percentage);
        assert_eq!(first.categories, second.categories);
    }

    #[test]
    fn percentage_guards_zero_denominator() {
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(3.0, 4.0), 75.0);
    }

    #[test]
    fn overall_feedback_threshold_boundaries() {
        assert!(overall_feedback(85.0).starts_with("Excellent"));
        assert!(overall_feedback(84.9).starts_with("Good"));
        assert!(overall_feedback(70.0).starts_with("Good"));
        assert!(overall_feedback(69.9).starts_with("You showed a basic"));
        assert!(overall_feedback(50.0).starts_with("You showed a basic"));
        assert!(overall_feedback(49.9).starts_with("You may need"));
    }
}
