use crate::error::Error;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, Value,
};
use std::collections::HashMap;

/// Applies a partial update to an existing record.
///
/// Only the columns present in `update_map` are touched; every other field of
/// `active_model` keeps its current value.
pub async fn update<A, C>(
    db: &DatabaseConnection,
    mut active_model: A,
    update_map: UpdateMap,
) -> Result<<A::Entity as EntityTrait>::Model, Error>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    C: ColumnTrait,
    A::Entity: EntityTrait<Column = C>,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    for column in C::iter() {
        if let Some(value) = update_map.get(&column.to_string()) {
            active_model.set(column, value.clone());
        }
    }
    Ok(active_model.update(db).await?)
}

/// Column name → new value pairs for a partial update.
#[derive(Default, Debug)]
pub struct UpdateMap {
    map: HashMap<String, Option<Value>>,
}

impl UpdateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key).and_then(|opt| opt.as_ref())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key).and_then(|opt| opt)
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }

    pub fn is_empty(&self) -> bool {
        self.map.values().all(Option::is_none)
    }
}

/// Converts a params struct into an `UpdateMap`.
pub trait IntoUpdateMap {
    fn into_update_map(self) -> UpdateMap;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_map_is_empty_when_only_none_values_present() {
        let mut map = UpdateMap::new();
        map.insert("name".to_string(), None);
        assert!(map.is_empty());

        map.insert(
            "name".to_string(),
            Some(Value::String(Some(Box::new("Ada".to_string())))),
        );
        assert!(!map.is_empty());
        assert!(map.remove("name").is_some());
        assert!(map.is_empty());
    }
}
