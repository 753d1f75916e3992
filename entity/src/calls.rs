//! SeaORM Entity for the call_history table.
//! One row per call attempt on a lead, either logged by an agent or written
//! by a telephony session.

use crate::call_outcome::CallOutcome;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::calls::Model)]
#[sea_orm(schema_name = "crm", table_name = "call_history")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub lead_id: Id,

    /// Employee who placed the call
    #[schema(value_type = Uuid)]
    pub employee_id: Id,

    pub outcome: CallOutcome,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    #[schema(value_type = String, format = DateTime)]
    pub call_date: DateTimeWithTimeZone,

    /// Scheduled follow-up, only meaningful when outcome is follow_up
    #[schema(value_type = Option<String>, format = DateTime)]
    pub next_follow_up: Option<DateTimeWithTimeZone>,

    /// Dial the lead automatically once the follow-up is due
    pub auto_call_followup: bool,

    /// Telephony provider call session id
    pub call_sid: Option<String>,

    pub from_number: Option<String>,

    pub to_number: Option<String>,

    pub duration_seconds: Option<i32>,

    pub recording_url: Option<String>,

    /// Raw status string reported by the telephony provider
    pub provider_status: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::leads::Entity",
        from = "Column::LeadId",
        to = "super::leads::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Leads,

    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employees,

    #[sea_orm(has_many = "super::analyses::Entity")]
    Analyses,
}

impl Related<super::leads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::analyses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Analyses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
