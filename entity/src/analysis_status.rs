use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a call analysis job through its lifecycle.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "analysis_status")]
pub enum AnalysisStatus {
    /// Job row exists but nothing has been dispatched yet
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Dispatched to the analysis service, waiting for its result
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl AnalysisStatus {
    /// Pending and processing jobs are in flight; completed and failed are terminal.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, AnalysisStatus::Pending | AnalysisStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_in_flight()
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Pending => write!(fmt, "pending"),
            AnalysisStatus::Processing => write!(fmt, "processing"),
            AnalysisStatus::Completed => write!(fmt, "completed"),
            AnalysisStatus::Failed => write!(fmt, "failed"),
        }
    }
}
