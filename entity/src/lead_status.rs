use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pipeline status of a lead.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lead_status")]
pub enum LeadStatus {
    /// Imported or created without an owner
    #[sea_orm(string_value = "unassigned")]
    #[default]
    Unassigned,
    /// Owned by a manager, not worked yet
    #[sea_orm(string_value = "assigned")]
    Assigned,
    /// In an employee's working set (also the state after a follow-up is deleted)
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "contacted")]
    Contacted,
    #[sea_orm(string_value = "follow_up")]
    FollowUp,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "not_interested")]
    NotInterested,
    /// Soft-deleted; kept for the removal record
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl LeadStatus {
    /// Whether the lead belongs to the active working set.
    pub fn is_active_working_set(&self) -> bool {
        !matches!(self, LeadStatus::Removed)
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadStatus::Unassigned => write!(fmt, "unassigned"),
            LeadStatus::Assigned => write!(fmt, "assigned"),
            LeadStatus::Active => write!(fmt, "active"),
            LeadStatus::Contacted => write!(fmt, "contacted"),
            LeadStatus::FollowUp => write!(fmt, "follow_up"),
            LeadStatus::Converted => write!(fmt, "converted"),
            LeadStatus::Completed => write!(fmt, "completed"),
            LeadStatus::NotInterested => write!(fmt, "not_interested"),
            LeadStatus::Removed => write!(fmt, "removed"),
        }
    }
}
