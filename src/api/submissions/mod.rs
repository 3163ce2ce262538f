use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::core::state::AppState;

mod helpers;
mod participant;
mod reviewer;

#[cfg(test)]
mod tests;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(participant::list_my_submissions))
        .route("/start", post(participant::start_submission))
        .route("/:submission_id", get(participant::get_submission))
        .route("/:submission_id/answers", put(participant::save_answer))
        .route("/:submission_id/finish", post(participant::finish_submission))
        .route("/:submission_id/grade", patch(reviewer::grade_submission))
}
