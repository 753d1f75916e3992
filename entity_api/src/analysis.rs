//! CRUD operations for the analyses table.

use super::error::Error;
use entity::analyses::{ActiveModel, Column, Entity, Model};
use entity::analysis_status::AnalysisStatus;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    sea_query::OnConflict,
    ConnectionTrait, DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Inserts a job for a call unless the call already has one. Returns `None` when
/// the unique `call_id` index rejected the insert.
pub async fn create_for_call(
    db: &DatabaseConnection,
    recording_id: Id,
    call_id: Id,
    status: AnalysisStatus,
) -> Result<Option<Model>, Error> {
    debug!("Creating analysis for recording {recording_id} (call {call_id})");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        recording_id: Set(recording_id),
        call_id: Set(Some(call_id)),
        status: Set(status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let inserted = Entity::insert(active_model)
        .on_conflict(OnConflict::column(Column::CallId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    if inserted == 0 {
        debug!("Call {call_id} already has an analysis");
        return Ok(None);
    }

    find_by_call_id(db, call_id).await
}

/// Stores the status, scores and summary carried by `model` on an existing analysis
pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Updating analysis {id}: {} -> {}", existing.status, model.status);

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        recording_id: Unchanged(existing.recording_id),
        call_id: Unchanged(existing.call_id),
        status: Set(model.status),
        sentiment_score: Set(model.sentiment_score),
        engagement_score: Set(model.engagement_score),
        confidence_score_executive: Set(model.confidence_score_executive),
        confidence_score_person: Set(model.confidence_score_person),
        summary: Set(model.summary),
        error_message: Set(model.error_message),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Puts an existing analysis back into `processing` and clears any previous result
pub async fn reset_to_processing(
    db: &DatabaseConnection,
    existing: Model,
    recording_id: Id,
) -> Result<Model, Error> {
    debug!("Resetting analysis {} to processing", existing.id);

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        recording_id: Set(recording_id),
        call_id: Unchanged(existing.call_id),
        status: Set(AnalysisStatus::Processing),
        sentiment_score: Set(None),
        engagement_score: Set(None),
        confidence_score_executive: Set(None),
        confidence_score_person: Set(None),
        summary: Set(None),
        error_message: Set(None),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

/// Finds the analysis linked to a call, if any
pub async fn find_by_call_id(
    db: &DatabaseConnection,
    call_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CallId.eq(call_id))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::UpdatedAt)
        .all(db)
        .await?)
}

/// Deletes every analysis linked to a call, returning how many were removed
pub async fn delete_by_call_id(db: &impl ConnectionTrait, call_id: Id) -> Result<u64, Error> {
    let result = Entity::delete_many()
        .filter(Column::CallId.eq(call_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
