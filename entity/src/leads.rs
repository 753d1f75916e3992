//! SeaORM Entity for the leads table.

use crate::lead_status::LeadStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::leads::Model)]
#[sea_orm(schema_name = "crm", table_name = "leads")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub name: String,

    pub email: Option<String>,

    pub phone: String,

    pub department: Option<String>,

    pub status: LeadStatus,

    /// Lead group owning this lead, if any
    #[schema(value_type = Option<Uuid>)]
    pub group_id: Option<Id>,

    /// Manager the lead was assigned to when it was created or last reassigned
    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<Id>,

    /// Employee working this lead
    #[schema(value_type = Option<Uuid>)]
    pub assigned_to: Option<Id>,

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
        belongs_to = "super::lead_groups::Entity",
        from = "Column::GroupId",
        to = "super::lead_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    LeadGroups,

    #[sea_orm(
        belongs_to = "super::managers::Entity",
        from = "Column::UserId",
        to = "super::managers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Managers,

    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::AssignedTo",
        to = "super::employees::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Employees,

    #[sea_orm(has_many = "super::calls::Entity")]
    Calls,
}

impl Related<super::lead_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadGroups.def()
    }
}

impl Related<super::managers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Managers.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::calls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
