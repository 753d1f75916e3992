//! Types for analysis dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body posted to the analysis webhook.
///
/// Carries the recording, analysis and call ids so the asynchronous result can be
/// correlated with the job row that is waiting for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub url: String,
    pub name: String,
    pub recording_id: String,
    pub analysis_id: String,
    pub user_id: String,
    pub call_id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Which transport carried a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The JSON request was accepted.
    Primary,
    /// The primary request failed and the form-encoded fallback was sent. Its
    /// response is not inspected, so delivery is unconfirmed.
    Fallback,
}
