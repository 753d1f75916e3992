use super::error::Error;
use entity::lead_groups::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, DatabaseConnection, QueryOrder, TryIntoModel,
};

pub async fn create(db: &DatabaseConnection, group_model: Model) -> Result<Model, Error> {
    debug!("New Lead Group Model to be inserted: {group_model:?}");

    let now = chrono::Utc::now();

    let group_active_model: ActiveModel = ActiveModel {
        name: Set(group_model.name),
        assigned_to: Set(group_model.assigned_to),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(group_active_model.save(db).await?.try_into_model()?)
}

/// Renames a group and/or points it at a different manager. Leads already in the
/// group keep the manager they were assigned with.
pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Updating lead group: {id}");

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        name: Set(model.name),
        assigned_to: Set(model.assigned_to),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().order_by_asc(Column::Name).all(db).await?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found());
    }
    Ok(())
}

/// Detaches every group owned by `manager_id`. Returns the number of groups touched.
pub async fn clear_manager(db: &impl ConnectionTrait, manager_id: Id) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::AssignedTo, Expr::value(Option::<Id>::None))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        )
        .filter(Column::AssignedTo.eq(manager_id))
        .exec(db)
        .await?;

    debug!(
        "Cleared manager {manager_id} from {} lead group(s)",
        result.rows_affected
    );
    Ok(result.rows_affected)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn group_model(assigned_to: Option<Id>) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            name: "Spring campaign".to_owned(),
            assigned_to,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn update_returns_the_updated_group() -> Result<(), Error> {
        let existing = group_model(None);
        let manager_id = Id::new_v4();
        let updated = Model {
            assigned_to: Some(manager_id),
            ..existing.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()], vec![updated.clone()]])
            .into_connection();

        let group = update(&db, existing.id, updated).await?;

        assert_eq!(group.assigned_to, Some(manager_id));
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_missing_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn clear_manager_reports_rows_affected() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        assert_eq!(clear_manager(&db, Id::new_v4()).await?, 2);
        Ok(())
    }
}
