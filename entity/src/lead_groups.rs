//! SeaORM Entity for the lead_groups table.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::lead_groups::Model)]
#[sea_orm(schema_name = "crm", table_name = "lead_groups")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub name: String,

    /// Manager currently responsible for the group. New leads added to the
    /// group are assigned to this manager.
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
    #[sea_orm(has_many = "super::leads::Entity")]
    Leads,

    #[sea_orm(
        belongs_to = "super::managers::Entity",
        from = "Column::AssignedTo",
        to = "super::managers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Managers,
}

impl Related<super::leads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl Related<super::managers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Managers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
