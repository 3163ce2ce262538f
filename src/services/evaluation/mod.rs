pub(crate) mod parser;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;
use crate::db::models::Question;
use crate::db::types::QuestionKind;

const EVALUATION_SYSTEM_PROMPT: &str = r#"You are an automated assessment assistant for an education platform.
Evaluate the student's response to one question against the stated criteria.

Scoring rules:
1. Award a numeric score based on the criteria. Single-answer questions score
   full points when correct and zero otherwise. Open-ended questions score on
   the scale stated in the criteria. Code answers are judged on correctness,
   efficiency and handling of edge cases.
2. Give detailed feedback explaining the score, highlighting strengths and
   areas for improvement.
3. Where applicable, provide a model answer or approach.

Respond with a single JSON object:
{
  "score": <number>,
  "maxScore": <number from the criteria>,
  "feedback": "<detailed explanation>",
  "modelAnswer": "<optional correct or improved answer>"
}
"#;

const UNAVAILABLE_FEEDBACK: &str =
    "The answer could not be evaluated automatically. A reviewer can grade it manually.";
const UNPARSEABLE_FEEDBACK: &str =
    "The evaluation service reply could not be interpreted. A reviewer can grade it manually.";

/// One question's inputs packaged for the external evaluator.
#[derive(Debug, Clone)]
pub(crate) struct EvaluationRequest {
    pub(crate) question_id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) prompt: String,
    pub(crate) answer: String,
    pub(crate) criteria: String,
}

impl EvaluationRequest {
    pub(crate) fn new(question: &Question, answer: &str) -> Self {
        Self {
            question_id: question.id.clone(),
            kind: question.kind,
            prompt: question.prompt.clone(),
            answer: answer.to_string(),
            criteria: question.evaluation_criteria.clone().unwrap_or_default(),
        }
    }
}

/// What the pipeline records for a question, whatever happened upstream.
#[derive(Debug, Clone)]
pub(crate) struct EvaluationOutcome {
    pub(crate) score: f64,
    pub(crate) max_score: f64,
    pub(crate) feedback: String,
    pub(crate) model_answer: Option<String>,
}

impl EvaluationOutcome {
    fn degraded(kind: QuestionKind, feedback: &str) -> Self {
        Self {
            score: 0.0,
            max_score: kind.default_max_score(),
            feedback: feedback.to_string(),
            model_answer: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EvaluationService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    max_retries: u32,
}

impl EvaluationService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let evaluator = settings.evaluator();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(evaluator.request_timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: evaluator.api_key.clone(),
            base_url: evaluator.base_url.trim_end_matches('/').to_string(),
            model: evaluator.model.clone(),
            max_tokens: evaluator.max_tokens,
            temperature: evaluator.temperature,
            max_retries: evaluator.max_retries,
        })
    }

    /// Evaluate one answer. Never fails: any transport or parse problem
    /// degrades to a zero-score outcome with an explanatory feedback string,
    /// so one bad question cannot abort the rest of a submission.
    pub(crate) async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        let raw = match self.call_model(request).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(
                    question_id = %request.question_id,
                    error = %err,
                    "Evaluation call failed"
                );
                metrics::counter!("evaluation_requests_total", "status" => "failed").increment(1);
                return EvaluationOutcome::degraded(request.kind, UNAVAILABLE_FEEDBACK);
            }
        };

        match parser::parse(&raw) {
            Ok(parsed) => {
                metrics::counter!("evaluation_requests_total", "status" => "ok").increment(1);
                EvaluationOutcome {
                    // Scores are non-negative by contract; a misbehaving
                    // model must not subtract points.
                    score: parsed.score.max(0.0),
                    max_score: parsed.max_score.unwrap_or_else(|| request.kind.default_max_score()),
                    feedback: parsed
                        .feedback
                        .unwrap_or_else(|| "No feedback was provided.".to_string()),
                    model_answer: parsed.model_answer,
                }
            }
            Err(err) => {
                tracing::warn!(
                    question_id = %request.question_id,
                    error = %err,
                    "Evaluation reply could not be parsed"
                );
                metrics::counter!("evaluation_requests_total", "status" => "unparseable")
                    .increment(1);
                EvaluationOutcome::degraded(request.kind, UNPARSEABLE_FEEDBACK)
            }
        }
    }

    async fn call_model(&self, request: &EvaluationRequest) -> Result<String> {
        let user_prompt = format!(
            "QUESTION TYPE: {}\n\nQUESTION: {}\n\nSTUDENT ANSWER: {}\n\nEVALUATION CRITERIA: {}\n\n\
             Evaluate the answer and reply with the JSON object described in the system prompt.",
            kind_label(request.kind),
            request.prompt,
            request.answer,
            request.criteria,
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": EVALUATION_SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt}
            ],
            "max_completion_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;
        let mut body = Value::Null;

        for attempt in 0..=self.max_retries {
            let response =
                self.client.post(&url).bearer_auth(&self.api_key).json(&payload).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    body = resp.json().await.unwrap_or(Value::Null);
                    if status.is_success() {
                        last_error = None;
                        break;
                    }
                    last_error = Some(anyhow::anyhow!("Evaluation service error: {body}"));
                }
                Err(err) => {
                    last_error =
                        Some(anyhow::anyhow!(err).context("Failed to call evaluation service"));
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
            }
        }

        if let Some(err) = last_error {
            return Err(err);
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .context("Missing evaluation service response content")?;

        Ok(content.to_string())
    }
}

fn kind_label(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::SingleAnswer => "multiple choice",
        QuestionKind::FreeText => "descriptive",
        QuestionKind::CodeSubmission => "practical coding",
        QuestionKind::SpokenResponse => "spoken response",
    }
}
