use super::error::Error;
use entity::employees::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, QueryOrder,
    TryIntoModel,
};

pub async fn create(db: &DatabaseConnection, employee_model: Model) -> Result<Model, Error> {
    debug!("New Employee Model to be inserted: {employee_model:?}");

    let now = chrono::Utc::now();

    let employee_active_model: ActiveModel = ActiveModel {
        manager_id: Set(employee_model.manager_id),
        name: Set(employee_model.name),
        email: Set(employee_model.email),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(employee_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().order_by_asc(Column::Name).all(db).await?)
}

pub async fn find_by_manager_id(
    db: &DatabaseConnection,
    manager_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ManagerId.eq(manager_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
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
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_by_manager_id_filters_on_manager() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let manager_id = Id::new_v4();
        let employees = find_by_manager_id(&db, manager_id).await?;
        assert!(employees.is_empty());

        assert_eq!(db.into_transaction_log().len(), 1);
        Ok(())
    }
}
