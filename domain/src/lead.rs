//! Lead registry: assignment resolution, filtering, imports and removal.

use crate::error::{AssignmentErrorKind, DomainErrorKind, Error, InternalErrorKind};
use crate::lead_status::LeadStatus;
use crate::leads::{self, Model};
use crate::{Id, UpdateMap};
use entity_api::{lead, lead_group, manager, mutate, removed_lead};
use log::*;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, IntoActiveModel, TransactionTrait, Value};
use serde::{Deserialize, Serialize};

pub use entity_api::lead::find_by_id;

/// Coarse status groups used by lead listings.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    #[default]
    All,
    Unassigned,
    Assigned,
    /// Being worked: active or contacted
    InProgress,
    FollowUp,
    /// Finished either way: converted, completed or not interested
    Closed,
    Removed,
}

impl StatusBucket {
    pub fn statuses(&self) -> Vec<LeadStatus> {
        match self {
            StatusBucket::All => vec![],
            StatusBucket::Unassigned => vec![LeadStatus::Unassigned],
            StatusBucket::Assigned => vec![LeadStatus::Assigned],
            StatusBucket::InProgress => vec![LeadStatus::Active, LeadStatus::Contacted],
            StatusBucket::FollowUp => vec![LeadStatus::FollowUp],
            StatusBucket::Closed => vec![
                LeadStatus::Converted,
                LeadStatus::Completed,
                LeadStatus::NotInterested,
            ],
            StatusBucket::Removed => vec![LeadStatus::Removed],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub manager_id: Option<Id>,
    pub assigned_to: Option<Id>,
    pub group_id: Option<Id>,
    pub bucket: StatusBucket,
    pub include_removed: bool,
}

impl From<LeadFilter> for lead::Filter {
    fn from(filter: LeadFilter) -> Self {
        lead::Filter {
            search: filter.search,
            department: filter.department,
            user_id: filter.manager_id,
            assigned_to: filter.assigned_to,
            group_id: filter.group_id,
            statuses: filter.bucket.statuses(),
            include_removed: filter.include_removed || filter.bucket == StatusBucket::Removed,
        }
    }
}

/// Who a lead should belong to. A group wins over an explicit manager.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct AssignmentTarget {
    pub group_id: Option<Id>,
    pub manager_id: Option<Id>,
}

/// Contact details of a lead that does not exist yet.
#[derive(Clone, Debug, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub department: Option<String>,
    pub assigned_to: Option<Id>,
}

impl NewLead {
    fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Lead name is required"));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::validation("Lead phone number is required"));
        }
        Ok(())
    }

    fn into_model(self, group_id: Option<Id>, manager_id: Id) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::nil(),
            name: self.name.trim().to_owned(),
            email: non_blank(self.email),
            phone: self.phone.trim().to_owned(),
            department: non_blank(self.department),
            status: LeadStatus::Assigned,
            group_id,
            user_id: Some(manager_id),
            assigned_to: self.assigned_to,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Resolves the manager a lead is assigned to.
///
/// With a group, that is the group's current manager and a group without one is
/// rejected. Without a group an explicit manager is required.
pub async fn resolve_assignment(
    db: &DatabaseConnection,
    target: AssignmentTarget,
) -> Result<Id, Error> {
    match (target.group_id, target.manager_id) {
        (Some(group_id), _) => {
            let group = lead_group::find_by_id(db, group_id).await?;
            group.assigned_to.ok_or_else(|| {
                warn!("Lead group {group_id} has no manager assigned");
                Error::assignment(AssignmentErrorKind::UnassignedGroup)
            })
        }
        (None, Some(manager_id)) => Ok(manager::find_by_id(db, manager_id).await?.id),
        (None, None) => Err(Error::assignment(AssignmentErrorKind::NoAssignment)),
    }
}

/// Creates a lead owned by the manager resolved from `target`. Nothing is written
/// when the assignment cannot be resolved.
pub async fn assign_lead(
    db: &DatabaseConnection,
    new_lead: NewLead,
    target: AssignmentTarget,
) -> Result<Model, Error> {
    new_lead.validate()?;
    let manager_id = resolve_assignment(db, target).await?;

    let lead = lead::create(db, new_lead.into_model(target.group_id, manager_id)).await?;
    info!("Lead {} assigned to manager {manager_id}", lead.id);
    Ok(lead)
}

/// Fails for soft-deleted leads.
pub(crate) fn ensure_not_removed(lead: &Model) -> Result<(), Error> {
    if lead.status == LeadStatus::Removed {
        warn!("Lead {} is removed", lead.id);
        return Err(Error::validation(format!("Lead {} has been removed", lead.id)));
    }
    Ok(())
}

/// Moves an existing lead to a new owner using the same rules as `assign_lead`.
/// Removed leads stay removed.
pub async fn reassign(
    db: &DatabaseConnection,
    lead_id: Id,
    target: AssignmentTarget,
) -> Result<Model, Error> {
    ensure_not_removed(&lead::find_by_id(db, lead_id).await?)?;
    let manager_id = resolve_assignment(db, target).await?;
    Ok(lead::assign(db, lead_id, target.group_id, manager_id).await?)
}

pub async fn find_by(db: &DatabaseConnection, filter: LeadFilter) -> Result<Vec<Model>, Error> {
    Ok(lead::find_by_filter(db, &filter.into()).await?)
}

/// Columns an admin may edit directly. Status and ownership have their own operations.
const EDITABLE_COLUMNS: [&str; 5] = ["name", "email", "phone", "department", "assigned_to"];

pub async fn update(db: &DatabaseConnection, lead_id: Id, mut changes: UpdateMap) -> Result<Model, Error> {
    let existing = find_by_id(db, lead_id).await?;

    let mut allowed = UpdateMap::new();
    for column in EDITABLE_COLUMNS {
        if let Some(value) = changes.remove(column) {
            if matches!(column, "name" | "phone") && is_blank(&value) {
                return Err(Error::validation(format!("Lead {column} cannot be blank")));
            }
            allowed.insert(column.to_owned(), Some(value));
        }
    }
    if allowed.is_empty() {
        return Ok(existing);
    }
    let now: DateTimeWithTimeZone = chrono::Utc::now().into();
    allowed.insert("updated_at".to_owned(), Some(now.into()));

    Ok(mutate::update::<leads::ActiveModel, leads::Column>(
        db,
        existing.into_active_model(),
        allowed,
    )
    .await?)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(Some(s)) => s.trim().is_empty(),
        Value::String(None) => true,
        _ => false,
    }
}

/// Soft-deletes a lead: stores a snapshot with the reason and marks it removed.
pub async fn remove(
    db: &DatabaseConnection,
    lead_id: Id,
    employee_id: Option<Id>,
    reason: &str,
) -> Result<Model, Error> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::validation("A reason is required to remove a lead"));
    }

    let txn = db.begin().await.map_err(Error::transaction)?;

    let existing = lead::find_by_id(&txn, lead_id).await?;
    let snapshot = serde_json::to_value(&existing).map_err(|err| Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
            "Failed to snapshot lead".to_string(),
        )),
    })?;
    removed_lead::create(&txn, lead_id, employee_id, reason.to_owned(), snapshot).await?;
    let removed = lead::update_status(&txn, lead_id, LeadStatus::Removed).await?;

    txn.commit().await.map_err(Error::transaction)?;

    info!("Lead {lead_id} removed by {employee_id:?}");
    Ok(removed)
}

/// Hard-deletes the given leads in a single statement.
pub async fn bulk_delete(db: &DatabaseConnection, lead_ids: Vec<Id>) -> Result<u64, Error> {
    if lead_ids.is_empty() {
        return Ok(0);
    }
    let requested = lead_ids.len();
    let deleted = lead::delete_by_ids(db, lead_ids).await?;
    info!("Bulk deleted {deleted} of {requested} requested lead(s)");
    Ok(deleted)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    phone: String,
    #[serde(default)]
    department: Option<String>,
}

/// Parses `name,email,phone,department` rows. Row numbers in errors are 1-based and
/// do not count the header.
pub fn parse_csv(csv_text: &str) -> Result<Vec<NewLead>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let mut leads = Vec::new();
    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row_number = index + 1;
        let row = record?;
        let new_lead = NewLead {
            name: row.name,
            email: row.email,
            phone: row.phone,
            department: row.department,
            assigned_to: None,
        };
        new_lead
            .validate()
            .map_err(|_| Error::validation(format!("Row {row_number}: name and phone are required")))?;
        leads.push(new_lead);
    }

    if leads.is_empty() {
        return Err(Error::validation("The CSV file contains no leads"));
    }
    Ok(leads)
}

/// Imports leads from CSV text. The assignment is resolved once for the whole
/// batch and all rows are inserted in one transaction.
pub async fn import_csv(
    db: &DatabaseConnection,
    csv_text: &str,
    target: AssignmentTarget,
) -> Result<Vec<Model>, Error> {
    let new_leads = parse_csv(csv_text)?;
    let manager_id = resolve_assignment(db, target).await?;

    let txn = db.begin().await.map_err(Error::transaction)?;
    let mut created = Vec::with_capacity(new_leads.len());
    for new_lead in new_leads {
        created.push(lead::create(&txn, new_lead.into_model(target.group_id, manager_id)).await?);
    }
    txn.commit().await.map_err(Error::transaction)?;

    info!("Imported {} lead(s) for manager {manager_id}", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_reads_optional_columns() {
        let leads = parse_csv(
            "name,email,phone,department\nAda Lovelace,ada@example.com,+15550001,Engineering\nGrace Hopper,,+15550002,\n",
        )
        .unwrap();

        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].email.as_deref(), Some("ada@example.com"));
        assert!(leads[1].email.is_none());
        assert!(leads[1].department.is_none());
    }

    #[test]
    fn parse_csv_names_the_offending_row() {
        let err = parse_csv("name,email,phone,department\nAda,,+15550001,\n  ,,+15550002,\n")
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(
                "Row 2: name and phone are required".to_owned()
            ))
        );
    }

    #[test]
    fn parse_csv_rejects_empty_files() {
        assert!(parse_csv("name,email,phone,department\n").is_err());
    }

    #[test]
    fn status_buckets_cover_every_status_exactly_once() {
        use sea_orm::Iterable;

        let buckets = [
            StatusBucket::Unassigned,
            StatusBucket::Assigned,
            StatusBucket::InProgress,
            StatusBucket::FollowUp,
            StatusBucket::Closed,
            StatusBucket::Removed,
        ];
        for status in LeadStatus::iter() {
            let owners = buckets
                .iter()
                .filter(|bucket| bucket.statuses().contains(&status))
                .count();
            assert_eq!(owners, 1, "{status} should belong to exactly one bucket");
        }
    }

    #[test]
    fn removed_bucket_includes_removed_leads() {
        let filter: lead::Filter = LeadFilter {
            bucket: StatusBucket::Removed,
            ..Default::default()
        }
        .into();
        assert!(filter.include_removed);

        let filter: lead::Filter = LeadFilter::default().into();
        assert!(!filter.include_removed);
        assert!(filter.statuses.is_empty());
    }
}
