use crate::company_settings::Model;
use crate::error::Error;
use log::*;
use sea_orm::DatabaseConnection;

/// The company calling settings. NotFound until an admin saves them.
pub async fn get(db: &DatabaseConnection) -> Result<Model, Error> {
    entity_api::company_setting::find(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn upsert(
    db: &DatabaseConnection,
    caller_id: Option<String>,
    from_numbers: Vec<String>,
) -> Result<Model, Error> {
    let caller_id = caller_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());
    let from_numbers = normalize_numbers(from_numbers)?;

    let settings = entity_api::company_setting::upsert(db, caller_id, from_numbers).await?;
    info!(
        "Saved company settings: {} from number(s), caller id {}",
        settings.from_numbers.len(),
        if settings.caller_id.is_some() { "set" } else { "unset" }
    );
    Ok(settings)
}

/// Trims every number and drops duplicates, keeping the first occurrence.
fn normalize_numbers(numbers: Vec<String>) -> Result<Vec<String>, Error> {
    let mut normalized: Vec<String> = Vec::with_capacity(numbers.len());
    for number in numbers {
        let number = number.trim();
        if number.is_empty() {
            return Err(Error::validation("From numbers cannot be blank"));
        }
        if !normalized.iter().any(|n| n == number) {
            normalized.push(number.to_owned());
        }
    }
    Ok(normalized)
}
