use domain::analysis::AnalysisResult;
use domain::analysis_status::AnalysisStatus;
use serde::Deserialize;
use utoipa::ToSchema;

/// Result callback body sent by the analysis service.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ResultParams {
    /// completed or failed
    pub(crate) status: AnalysisStatus,
    pub(crate) sentiment_score: Option<f64>,
    pub(crate) engagement_score: Option<f64>,
    pub(crate) confidence_score_executive: Option<f64>,
    pub(crate) confidence_score_person: Option<f64>,
    pub(crate) summary: Option<String>,
    pub(crate) error_message: Option<String>,
}

impl From<ResultParams> for AnalysisResult {
    fn from(params: ResultParams) -> Self {
        AnalysisResult {
            status: params.status,
            sentiment_score: params.sentiment_score,
            engagement_score: params.engagement_score,
            confidence_score_executive: params.confidence_score_executive,
            confidence_score_person: params.confidence_score_person,
            summary: params.summary,
            error_message: params.error_message,
        }
    }
}
