use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct RecentSubmissionResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) date: Option<String>,
    pub(crate) score: Option<f64>,
    pub(crate) max_score: Option<f64>,
    pub(crate) percentage: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyticsResponse {
    pub(crate) assessments_taken: i64,
    pub(crate) average_score: f64,
    pub(crate) recent_submissions: Vec<RecentSubmissionResponse>,
}
