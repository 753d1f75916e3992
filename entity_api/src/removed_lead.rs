use super::error::Error;
use entity::removed_leads::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, QueryOrder,
    TryIntoModel,
};

/// Writes the removal record for a lead; `lead_snapshot` is the lead as it looked
/// right before removal.
pub async fn create(
    db: &impl ConnectionTrait,
    lead_id: Id,
    employee_id: Option<Id>,
    reason: String,
    lead_snapshot: Json,
) -> Result<Model, Error> {
    debug!("Recording removal of lead {lead_id} by {employee_id:?}");

    let active_model = ActiveModel {
        lead_id: Set(lead_id),
        employee_id: Set(employee_id),
        reason: Set(reason),
        lead_snapshot: Set(lead_snapshot),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_lead_id(db: &DatabaseConnection, lead_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::LeadId.eq(lead_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}
