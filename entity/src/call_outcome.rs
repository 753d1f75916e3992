use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Classified result of a single call attempt.
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
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "call_outcome")]
pub enum CallOutcome {
    #[sea_orm(string_value = "interested")]
    Interested,
    #[sea_orm(string_value = "not_interested")]
    NotInterested,
    #[sea_orm(string_value = "follow_up")]
    FollowUp,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "lost")]
    Lost,
    /// Default outcome of a dialed call that connected
    #[sea_orm(string_value = "completed")]
    #[default]
    Completed,
    /// Busy or no answer from the telephony provider
    #[sea_orm(string_value = "not_answered")]
    NotAnswered,
    /// Provider reported a failed call
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl CallOutcome {
    /// Outcomes produced by the dialer alone; the agent fills in no notes for these.
    pub fn is_unanswered(&self) -> bool {
        matches!(self, CallOutcome::NotAnswered | CallOutcome::Failed)
    }
}

impl std::fmt::Display for CallOutcome {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallOutcome::Interested => write!(fmt, "interested"),
            CallOutcome::NotInterested => write!(fmt, "not_interested"),
            CallOutcome::FollowUp => write!(fmt, "follow_up"),
            CallOutcome::Converted => write!(fmt, "converted"),
            CallOutcome::Lost => write!(fmt, "lost"),
            CallOutcome::Completed => write!(fmt, "completed"),
            CallOutcome::NotAnswered => write!(fmt, "not_answered"),
            CallOutcome::Failed => write!(fmt, "failed"),
        }
    }
}
