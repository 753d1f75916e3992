use crate::error::Error;
use crate::lead_groups::Model;
use crate::Id;
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;

pub use entity_api::lead_group::{create, find_all, find_by_id, update};

/// How many lead names a deletion preview shows.
const PREVIEW_SAMPLE_SIZE: u64 = 5;

/// What deleting a group would take down with it.
#[derive(Debug, Serialize)]
pub struct DeletionPreview {
    pub group: Model,
    pub lead_count: u64,
    pub sample_names: Vec<String>,
}

/// The manager new leads in this group are assigned to, if the group has one.
pub async fn resolve_group_manager(db: &DatabaseConnection, group_id: Id) -> Result<Option<Id>, Error> {
    Ok(find_by_id(db, group_id).await?.assigned_to)
}

pub async fn preview_deletion(db: &DatabaseConnection, group_id: Id) -> Result<DeletionPreview, Error> {
    let group = find_by_id(db, group_id).await?;
    let lead_count = entity_api::lead::count_by_group_id(db, group_id).await?;
    let sample_names =
        entity_api::lead::find_names_by_group_id(db, group_id, PREVIEW_SAMPLE_SIZE).await?;

    Ok(DeletionPreview {
        group,
        lead_count,
        sample_names,
    })
}

/// Deletes a group and every lead in it. Both deletes run in one transaction, so
/// the group survives if the lead cascade fails. Returns the number of leads deleted.
pub async fn delete(db: &DatabaseConnection, group_id: Id) -> Result<u64, Error> {
    // Surface a missing group as NotFound before opening a transaction
    find_by_id(db, group_id).await?;

    let txn = db.begin().await.map_err(Error::transaction)?;

    let deleted_leads = entity_api::lead::delete_by_group_id(&txn, group_id).await?;
    entity_api::lead_group::delete_by_id(&txn, group_id).await?;

    txn.commit().await.map_err(Error::transaction)?;

    info!("Deleted lead group {group_id} and {deleted_leads} lead(s)");
    Ok(deleted_leads)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn group_model(assigned_to: Option<Id>) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            name: "Trade show".to_owned(),
            assigned_to,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn lead_named(name: &str, group_id: Id) -> crate::leads::Model {
        let now = chrono::Utc::now();
        crate::leads::Model {
            id: Id::new_v4(),
            name: name.to_owned(),
            email: None,
            phone: "+15550000000".to_owned(),
            department: None,
            status: Default::default(),
            group_id: Some(group_id),
            user_id: None,
            assigned_to: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn delete_reports_the_number_of_cascaded_leads() -> Result<(), Error> {
        let group = group_model(None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![group.clone()]])
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 4,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let deleted = delete(&db, group.id).await?;

        assert_eq!(deleted, 4);
        Ok(())
    }

    #[tokio::test]
    async fn delete_fails_without_deleting_the_group_when_the_cascade_fails() {
        let group = group_model(None);
        // No exec results: the lead cascade fails and the group delete never runs
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![group.clone()]])
            .into_connection();

        let result = delete(&db, group.id).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_returns_not_found_for_missing_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = delete(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }

    #[tokio::test]
    async fn preview_deletion_counts_leads_and_samples_names() -> Result<(), Error> {
        let group = group_model(Some(Id::new_v4()));
        let count_row = BTreeMap::from([("num_items".to_owned(), Value::BigInt(Some(7)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![group.clone()]])
            .append_query_results(vec![vec![count_row]])
            .append_query_results(vec![vec![
                lead_named("Ada", group.id),
                lead_named("Grace", group.id),
            ]])
            .into_connection();

        let preview = preview_deletion(&db, group.id).await?;

        assert_eq!(preview.group.id, group.id);
        assert_eq!(preview.lead_count, 7);
        assert_eq!(preview.sample_names, vec!["Ada", "Grace"]);
        Ok(())
    }
}
