use crate::error::Error;
use crate::managers::Model;
use crate::Id;
use email_address::EmailAddress;
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

pub use entity_api::manager::{find_all, find_by_id};

pub async fn create(db: &DatabaseConnection, manager_model: Model) -> Result<Model, Error> {
    validate_person(&manager_model.name, &manager_model.email)?;
    let manager = entity_api::manager::create(
        db,
        Model {
            email: manager_model.email.trim().to_lowercase(),
            ..manager_model
        },
    )
    .await?;
    info!("Created manager {}", manager.id);
    Ok(manager)
}

/// Deletes a manager and detaches the lead groups they owned in the same transaction.
pub async fn delete(db: &DatabaseConnection, manager_id: Id) -> Result<(), Error> {
    let txn = db.begin().await.map_err(Error::transaction)?;

    let detached = entity_api::lead_group::clear_manager(&txn, manager_id).await?;
    entity_api::manager::delete_by_id(&txn, manager_id).await?;

    txn.commit().await.map_err(Error::transaction)?;

    info!("Deleted manager {manager_id}, detached {detached} lead group(s)");
    Ok(())
}

/// Shared by managers and employees.
pub(crate) fn validate_person(name: &str, email: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::validation("Name is required"));
    }
    if !EmailAddress::is_valid(email.trim()) {
        return Err(Error::validation(format!("'{email}' is not a valid email address")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_person_rejects_malformed_email() {
        assert!(validate_person("Grace", "grace@example.com").is_ok());
        assert!(validate_person("Grace", "grace.example.com").is_err());
        assert!(validate_person("  ", "grace@example.com").is_err());
    }
}
