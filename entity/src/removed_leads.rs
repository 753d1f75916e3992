//! SeaORM Entity for the removed_leads table.
//! Written when an employee soft-deletes a lead; keeps a snapshot of the lead
//! as it was at removal time.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::removed_leads::Model)]
#[sea_orm(schema_name = "crm", table_name = "removed_leads")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub lead_id: Id,

    /// Employee who removed the lead
    #[schema(value_type = Option<Uuid>)]
    pub employee_id: Option<Id>,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    #[schema(value_type = Object)]
    pub lead_snapshot: Json,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::leads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
