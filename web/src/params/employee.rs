use domain::{Id, IntoQueryFilterMap, QueryFilterMap};
use sea_orm::Value;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    #[param(value_type = Option<Uuid>)]
    pub(crate) manager_id: Option<Id>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "manager_id".to_string(),
            self.manager_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );

        query_filter_map
    }
}
