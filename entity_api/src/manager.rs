use super::error::Error;
use entity::managers::{ActiveModel, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, QueryOrder,
    TryIntoModel,
};

pub async fn create(db: &DatabaseConnection, manager_model: Model) -> Result<Model, Error> {
    debug!("New Manager Model to be inserted: {manager_model:?}");

    let now = chrono::Utc::now();

    let manager_active_model: ActiveModel = ActiveModel {
        name: Set(manager_model.name),
        email: Set(manager_model.email),
        phone: Set(manager_model.phone),
        department: Set(manager_model.department),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(manager_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_asc(entity::managers::Column::Name)
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
