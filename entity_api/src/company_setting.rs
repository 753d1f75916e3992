//! The company calling settings live in a single row.

use super::error::Error;
use entity::company_settings::{ActiveModel, Column, Entity, Model};
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

pub async fn find(db: &DatabaseConnection) -> Result<Option<Model>, Error> {
    Ok(Entity::find().order_by_asc(Column::CreatedAt).one(db).await?)
}

/// Creates the settings row on first use, otherwise overwrites it.
pub async fn upsert(
    db: &DatabaseConnection,
    caller_id: Option<String>,
    from_numbers: Vec<String>,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    match find(db).await? {
        Some(existing) => {
            debug!("Updating company settings {}", existing.id);
            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                caller_id: Set(caller_id),
                from_numbers: Set(from_numbers),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(now.into()),
            };
            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Creating company settings");
            let active_model = ActiveModel {
                caller_id: Set(caller_id),
                from_numbers: Set(from_numbers),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(active_model.save(db).await?.try_into_model()?)
        }
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn upsert_creates_the_row_when_missing() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let settings = Model {
            id: Id::new_v4(),
            caller_id: Some("+15550100".to_owned()),
            from_numbers: vec!["+15550101".to_owned()],
            created_at: now.into(),
            updated_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new(), vec![settings.clone()]])
            .into_connection();

        let result = upsert(
            &db,
            settings.caller_id.clone(),
            settings.from_numbers.clone(),
        )
        .await?;

        assert_eq!(result, settings);
        Ok(())
    }
}
