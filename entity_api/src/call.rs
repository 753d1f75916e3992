//! Queries over the call_history table.
//!
//! "Latest" always means newest `created_at`, with the higher id winning when two
//! rows share a timestamp, so every caller sees the same row.

use super::error::Error;
use entity::call_outcome::CallOutcome;
use entity::calls::{ActiveModel, Column, Entity, Model};
use entity::lead_status::LeadStatus;
use entity::{leads, Id};
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, DatabaseConnection,
    QueryOrder, QuerySelect, Select, TryIntoModel,
};

pub async fn create(db: &impl ConnectionTrait, call_model: Model) -> Result<Model, Error> {
    debug!("New Call Model to be inserted: {call_model:?}");

    let now = chrono::Utc::now();

    let call_active_model: ActiveModel = ActiveModel {
        lead_id: Set(call_model.lead_id),
        employee_id: Set(call_model.employee_id),
        outcome: Set(call_model.outcome),
        notes: Set(call_model.notes),
        call_date: Set(call_model.call_date),
        next_follow_up: Set(call_model.next_follow_up),
        auto_call_followup: Set(call_model.auto_call_followup),
        call_sid: Set(call_model.call_sid),
        from_number: Set(call_model.from_number),
        to_number: Set(call_model.to_number),
        duration_seconds: Set(call_model.duration_seconds),
        recording_url: Set(call_model.recording_url),
        provider_status: Set(call_model.provider_status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(call_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

fn newest_first(select: Select<Entity>) -> Select<Entity> {
    select
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// Call history of a lead, newest first.
pub async fn find_by_lead_id(db: &DatabaseConnection, lead_id: Id) -> Result<Vec<Model>, Error> {
    Ok(
        newest_first(Entity::find().filter(Column::LeadId.eq(lead_id)))
            .all(db)
            .await?,
    )
}

pub async fn find_latest_by_lead_id(
    db: &impl ConnectionTrait,
    lead_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(
        newest_first(Entity::find().filter(Column::LeadId.eq(lead_id)))
            .one(db)
            .await?,
    )
}

/// Most recent call of a lead that carries a scheduled follow-up.
pub async fn find_latest_follow_up_by_lead_id(
    db: &impl ConnectionTrait,
    lead_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(newest_first(
        Entity::find()
            .filter(Column::LeadId.eq(lead_id))
            .filter(Column::NextFollowUp.is_not_null()),
    )
    .one(db)
    .await?)
}

/// Follow-up calls flagged for auto-dial whose time has come and whose lead is
/// still waiting on the follow-up. Only a lead's latest call counts, so a lead
/// is listed at most once.
pub async fn find_due_auto_calls(
    db: &DatabaseConnection,
    now: DateTimeWithTimeZone,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .inner_join(leads::Entity)
        .filter(Expr::cust(
            "NOT EXISTS (SELECT 1 FROM crm.call_history newer \
             WHERE newer.lead_id = call_history.lead_id \
             AND (newer.created_at, newer.id) > (call_history.created_at, call_history.id))",
        ))
        .filter(Column::Outcome.eq(CallOutcome::FollowUp))
        .filter(Column::AutoCallFollowup.eq(true))
        .filter(Column::NextFollowUp.lte(now))
        .filter(leads::Column::Status.eq(LeadStatus::FollowUp))
        .order_by_asc(Column::NextFollowUp)
        .all(db)
        .await?)
}

/// Stores the agent's classification of a call.
pub async fn classify(
    db: &impl ConnectionTrait,
    id: Id,
    outcome: CallOutcome,
    notes: String,
    next_follow_up: Option<DateTimeWithTimeZone>,
    auto_call_followup: bool,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Classifying call {id} as {outcome}");

    let mut active_model: ActiveModel = existing.into();
    active_model.outcome = Set(outcome);
    active_model.notes = Set(notes);
    active_model.next_follow_up = Set(next_follow_up);
    active_model.auto_call_followup = Set(auto_call_followup);
    active_model.updated_at = Set(chrono::Utc::now().into());

    Ok(active_model.update(db).await?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found());
    }
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn call_model(outcome: CallOutcome) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            lead_id: Id::new_v4(),
            employee_id: Id::new_v4(),
            outcome,
            notes: "Asked for pricing".to_owned(),
            call_date: now.into(),
            next_follow_up: None,
            auto_call_followup: false,
            call_sid: None,
            from_number: None,
            to_number: None,
            duration_seconds: None,
            recording_url: None,
            provider_status: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_call_model() -> Result<(), Error> {
        let call = call_model(CallOutcome::Interested);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .into_connection();

        let created = create(&db, call.clone()).await?;

        assert_eq!(created, call);
        Ok(())
    }

    #[tokio::test]
    async fn find_latest_by_lead_id_returns_none_without_calls() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        assert!(find_latest_by_lead_id(&db, Id::new_v4()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn classify_returns_the_updated_call() -> Result<(), Error> {
        let call = call_model(CallOutcome::Completed);
        let follow_up = chrono::Utc::now() + chrono::Duration::days(1);
        let classified = Model {
            outcome: CallOutcome::FollowUp,
            next_follow_up: Some(follow_up.into()),
            auto_call_followup: true,
            ..call.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()], vec![classified.clone()]])
            .into_connection();

        let result = classify(
            &db,
            call.id,
            CallOutcome::FollowUp,
            call.notes.clone(),
            Some(follow_up.into()),
            true,
        )
        .await?;

        assert_eq!(result, classified);
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_id_returns_not_found_for_missing_call() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = delete_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn find_due_auto_calls_skips_superseded_follow_ups() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        find_due_auto_calls(&db, chrono::Utc::now().into()).await?;

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("NOT EXISTS (SELECT 1 FROM crm.call_history newer"));
        Ok(())
    }
}
