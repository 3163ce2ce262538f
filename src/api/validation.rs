use crate::api::errors::ApiError;
use crate::db::types::QuestionKind;
use crate::schemas::assessment::QuestionCreate;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Cross-field checks the derive-level validators cannot express: a
/// single-answer question needs a real option list and a correct option
/// drawn from it.
pub(crate) fn validate_question(index: usize, question: &QuestionCreate) -> Result<(), ApiError> {
    if question.kind != QuestionKind::SingleAnswer {
        return Ok(());
    }

    if question.options.len() < 2 {
        return Err(ApiError::BadRequest(format!(
            "Question {}: single-answer questions need at least two options",
            index + 1
        )));
    }

    let Some(correct) = question.correct_option.as_deref() else {
        return Err(ApiError::BadRequest(format!(
            "Question {}: single-answer questions need a correct option",
            index + 1
        )));
    };

    if !question.options.iter().any(|option| option == correct) {
        return Err(ApiError::BadRequest(format!(
            "Question {}: correct option must be one of the listed options",
            index + 1
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind, options: &[&str], correct: Option<&str>) -> QuestionCreate {
        QuestionCreate {
            kind,
            prompt: "prompt".to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
            correct_option: correct.map(|value| value.to_string()),
            points: 1,
            evaluation_criteria: None,
        }
    }

    #[test]
    fn single_answer_requires_options_and_member_correct() {
        let valid = question(QuestionKind::SingleAnswer, &["A", "B"], Some("B"));
        assert!(validate_question(0, &valid).is_ok());

        let too_few = question(QuestionKind::SingleAnswer, &["A"], Some("A"));
        assert!(validate_question(0, &too_few).is_err());

        let missing_correct = question(QuestionKind::SingleAnswer, &["A", "B"], None);
        assert!(validate_question(0, &missing_correct).is_err());

        let stray_correct = question(QuestionKind::SingleAnswer, &["A", "B"], Some("C"));
        assert!(validate_question(0, &stray_correct).is_err());
    }

    #[test]
    fn free_text_needs_no_options() {
        let free = question(QuestionKind::FreeText, &[], None);
        assert!(validate_question(0, &free).is_ok());
    }

    #[test]
    fn password_length_boundary() {
        assert!(validate_password_len("12345678").is_ok());
        assert!(validate_password_len("1234567").is_err());
    }
}
