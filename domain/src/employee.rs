use crate::employees::{self, Model};
use crate::error::Error;
use crate::manager::validate_person;
use crate::Id;
use entity_api::query::{self, IntoQueryFilterMap};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::employee::{find_all, find_by_id};

pub async fn create(db: &DatabaseConnection, employee_model: Model) -> Result<Model, Error> {
    validate_person(&employee_model.name, &employee_model.email)?;
    if let Some(manager_id) = employee_model.manager_id {
        entity_api::manager::find_by_id(db, manager_id).await?;
    }

    let employee = entity_api::employee::create(
        db,
        Model {
            email: employee_model.email.trim().to_lowercase(),
            ..employee_model
        },
    )
    .await?;
    info!("Created employee {}", employee.id);
    Ok(employee)
}

pub async fn find_by(
    db: &DatabaseConnection,
    params: impl IntoQueryFilterMap,
) -> Result<Vec<Model>, Error> {
    let employees =
        query::find_by::<employees::Entity, employees::Column>(db, params.into_query_filter_map())
            .await?;

    Ok(employees)
}

pub async fn delete(db: &DatabaseConnection, employee_id: Id) -> Result<(), Error> {
    entity_api::employee::delete_by_id(db, employee_id).await?;
    info!("Deleted employee {employee_id}");
    Ok(())
}
