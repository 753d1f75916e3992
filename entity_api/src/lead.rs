use super::error::Error;
use entity::lead_status::LeadStatus;
use entity::leads::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Func},
    ActiveValue::Set,
    Condition, ConnectionTrait, DatabaseConnection, QueryOrder, QuerySelect, TryIntoModel,
};

/// Narrows a lead listing. Every set field must match; `search` is a
/// case-insensitive substring match over name, email, phone and department.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub user_id: Option<Id>,
    pub assigned_to: Option<Id>,
    pub group_id: Option<Id>,
    pub statuses: Vec<LeadStatus>,
    pub include_removed: bool,
}

pub async fn create(db: &impl ConnectionTrait, lead_model: Model) -> Result<Model, Error> {
    debug!("New Lead Model to be inserted: {lead_model:?}");

    let now = chrono::Utc::now();

    let lead_active_model: ActiveModel = ActiveModel {
        name: Set(lead_model.name),
        email: Set(lead_model.email),
        phone: Set(lead_model.phone),
        department: Set(lead_model.department),
        status: Set(lead_model.status),
        group_id: Set(lead_model.group_id),
        user_id: Set(lead_model.user_id),
        assigned_to: Set(lead_model.assigned_to),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(lead_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(Error::not_found)
}

pub async fn find_by_filter(db: &DatabaseConnection, filter: &Filter) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find();

    if let Some(search) = filter.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            let pattern = format!("%{}%", search.to_lowercase());
            let mut condition = Condition::any();
            for column in [Column::Name, Column::Email, Column::Phone, Column::Department] {
                condition = condition
                    .add(Expr::expr(Func::lower(Expr::col((Entity, column)))).like(pattern.clone()));
            }
            query = query.filter(condition);
        }
    }

    if let Some(department) = &filter.department {
        query = query.filter(Column::Department.eq(department.clone()));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(Column::UserId.eq(user_id));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(Column::AssignedTo.eq(assigned_to));
    }
    if let Some(group_id) = filter.group_id {
        query = query.filter(Column::GroupId.eq(group_id));
    }
    if !filter.statuses.is_empty() {
        query = query.filter(Column::Status.is_in(filter.statuses.iter().copied()));
    }
    if !filter.include_removed {
        query = query.filter(Column::Status.ne(LeadStatus::Removed));
    }

    Ok(query
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?)
}

pub async fn count_by_group_id(db: &impl ConnectionTrait, group_id: Id) -> Result<u64, Error> {
    Ok(Entity::find()
        .filter(Column::GroupId.eq(group_id))
        .count(db)
        .await?)
}

/// Names of up to `limit` leads in a group, oldest first.
pub async fn find_names_by_group_id(
    db: &impl ConnectionTrait,
    group_id: Id,
    limit: u64,
) -> Result<Vec<String>, Error> {
    Ok(Entity::find()
        .filter(Column::GroupId.eq(group_id))
        .order_by_asc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(|lead| lead.name)
        .collect())
}

pub async fn update_status(
    db: &impl ConnectionTrait,
    id: Id,
    status: LeadStatus,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Updating lead {id} status {} -> {status}", existing.status);

    let mut active_model: ActiveModel = existing.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(chrono::Utc::now().into());

    Ok(active_model.update(db).await?)
}

/// Points a lead at a new owner and marks it assigned.
pub async fn assign(
    db: &DatabaseConnection,
    id: Id,
    group_id: Option<Id>,
    user_id: Id,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Assigning lead {id} to manager {user_id} (group {group_id:?})");

    let mut active_model: ActiveModel = existing.into();
    active_model.group_id = Set(group_id);
    active_model.user_id = Set(Some(user_id));
    active_model.status = Set(LeadStatus::Assigned);
    active_model.updated_at = Set(chrono::Utc::now().into());

    Ok(active_model.update(db).await?)
}

/// Deletes all leads with the given ids in a single statement.
pub async fn delete_by_ids(db: &DatabaseConnection, ids: Vec<Id>) -> Result<u64, Error> {
    let result = Entity::delete_many()
        .filter(Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_by_group_id(db: &impl ConnectionTrait, group_id: Id) -> Result<u64, Error> {
    let result = Entity::delete_many()
        .filter(Column::GroupId.eq(group_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
