use domain::lead::{AssignmentTarget, LeadFilter, NewLead, StatusBucket};
use domain::{Id, IntoUpdateMap, UpdateMap};
use sea_orm::Value;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// Case-insensitive match against name, email, phone and department
    pub(crate) search: Option<String>,
    pub(crate) department: Option<String>,
    #[param(value_type = Option<Uuid>)]
    pub(crate) manager_id: Option<Id>,
    #[param(value_type = Option<Uuid>)]
    pub(crate) assigned_to: Option<Id>,
    #[param(value_type = Option<Uuid>)]
    pub(crate) group_id: Option<Id>,
    /// One of all, unassigned, assigned, in_progress, follow_up, closed, removed
    #[param(value_type = Option<String>)]
    pub(crate) bucket: Option<StatusBucket>,
    #[serde(default)]
    pub(crate) include_removed: bool,
}

impl From<IndexParams> for LeadFilter {
    fn from(params: IndexParams) -> Self {
        LeadFilter {
            search: params.search.filter(|s| !s.trim().is_empty()),
            department: params.department,
            manager_id: params.manager_id,
            assigned_to: params.assigned_to,
            group_id: params.group_id,
            bucket: params.bucket.unwrap_or_default(),
            include_removed: params.include_removed,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) phone: String,
    pub(crate) department: Option<String>,
    /// Employee working the lead
    #[schema(value_type = Option<Uuid>)]
    pub(crate) assigned_to: Option<Id>,
    /// Takes precedence over `manager_id`
    #[schema(value_type = Option<Uuid>)]
    pub(crate) group_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub(crate) manager_id: Option<Id>,
}

impl CreateParams {
    pub(crate) fn into_parts(self) -> (NewLead, AssignmentTarget) {
        (
            NewLead {
                name: self.name,
                email: self.email,
                phone: self.phone,
                department: self.department,
                assigned_to: self.assigned_to,
            },
            AssignmentTarget {
                group_id: self.group_id,
                manager_id: self.manager_id,
            },
        )
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AssignmentParams {
    #[schema(value_type = Option<Uuid>)]
    pub(crate) group_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub(crate) manager_id: Option<Id>,
}

impl From<AssignmentParams> for AssignmentTarget {
    fn from(params: AssignmentParams) -> Self {
        AssignmentTarget {
            group_id: params.group_id,
            manager_id: params.manager_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ImportParams {
    /// CSV text with a `name,email,phone,department` header row
    pub(crate) csv: String,
    #[schema(value_type = Option<Uuid>)]
    pub(crate) group_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub(crate) manager_id: Option<Id>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub(crate) struct UpdateParams {
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) department: Option<String>,
    #[schema(value_type = Option<Uuid>)]
    pub(crate) assigned_to: Option<Id>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert("name".to_string(), self.name.map(Value::from));
        update_map.insert("email".to_string(), self.email.map(Value::from));
        update_map.insert("phone".to_string(), self.phone.map(Value::from));
        update_map.insert("department".to_string(), self.department.map(Value::from));
        update_map.insert("assigned_to".to_string(), self.assigned_to.map(Value::from));
        update_map
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RemovalParams {
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct BulkDeleteParams {
    #[schema(value_type = Vec<Uuid>)]
    pub(crate) ids: Vec<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_ignored() {
        let filter: LeadFilter = IndexParams {
            search: Some("  ".to_string()),
            ..Default::default()
        }
        .into();

        assert!(filter.search.is_none());
        assert_eq!(filter.bucket, StatusBucket::All);
    }

    #[test]
    fn update_params_only_carry_provided_fields() {
        let update_map = UpdateParams {
            phone: Some("+15550009".to_string()),
            ..Default::default()
        }
        .into_update_map();

        assert!(update_map.get("phone").is_some());
        assert!(update_map.get("name").is_none());
        assert!(!update_map.is_empty());
    }

    #[test]
    fn bucket_query_values_are_snake_case() {
        let params: IndexParams =
            serde_json::from_value(serde_json::json!({ "bucket": "in_progress" })).unwrap();

        assert_eq!(params.bucket, Some(StatusBucket::InProgress));
    }
}
