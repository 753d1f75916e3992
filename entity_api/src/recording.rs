use super::error::Error;
use entity::recordings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, DatabaseConnection};

/// Returns the recording stored for `(owner_id, url)`, inserting it first when
/// absent. Concurrent callers for the same pair end up with the same row.
pub async fn find_or_create(
    db: &DatabaseConnection,
    owner_id: Id,
    url: &str,
    filename: &str,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        owner_id: Set(owner_id),
        url: Set(url.to_owned()),
        filename: Set(filename.to_owned()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let inserted = Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([Column::OwnerId, Column::Url])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    if inserted > 0 {
        debug!("Created recording for owner {owner_id}: {url}");
    }

    find_by_owner_and_url(db, owner_id, url)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn find_by_owner_and_url(
    db: &DatabaseConnection,
    owner_id: Id,
    url: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .filter(Column::Url.eq(url))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn recording_model() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            owner_id: Id::new_v4(),
            url: "https://recordings.example.com/RE123.mp3".to_owned(),
            filename: "RE123.mp3".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_owner_and_url_returns_existing_recording() -> Result<(), Error> {
        let recording = recording_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![recording.clone()]])
            .into_connection();

        let found = find_by_owner_and_url(&db, recording.owner_id, &recording.url).await?;

        assert_eq!(found, Some(recording));
        Ok(())
    }

    #[tokio::test]
    async fn find_or_create_reads_back_the_row_another_writer_inserted() -> Result<(), Error> {
        let recording = recording_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results(vec![vec![recording.clone()]])
            .into_connection();

        let found = find_or_create(&db, recording.owner_id, &recording.url, "RE123.mp3").await?;

        assert_eq!(found, recording);
        Ok(())
    }
}
