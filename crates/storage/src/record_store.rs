use endpoint_relay_domain::storage::{
    fields, Record, RecordQuery, RecordStore, StorageError, StorageResult, DEFINITION_TABLE,
    VALUE_TABLE,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::entity::{configuration_definitions, configuration_values};
use crate::SeaOrmRecordStore;

#[async_trait::async_trait]
impl RecordStore for SeaOrmRecordStore {
    async fn query(&self, query: &RecordQuery) -> StorageResult<Vec<Record>> {
        debug!(
            table = query.table_name(),
            filter = %query.filter_expression(),
            "record store query"
        );
        match query.table_name() {
            DEFINITION_TABLE => self.query_definitions(query).await,
            VALUE_TABLE => self.query_values(query).await,
            other => Err(StorageError::UnknownTable(other.to_string())),
        }
    }
}

impl SeaOrmRecordStore {
    async fn query_definitions(&self, query: &RecordQuery) -> StorageResult<Vec<Record>> {
        let mut select = configuration_definitions::Entity::find()
            .order_by_asc(configuration_definitions::Column::Id);
        for filter in query.filters() {
            let column = definition_column(filter.field())?;
            select = select.filter(column.eq(filter.value()));
        }

        let models = select
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        models
            .into_iter()
            .map(|model| {
                project(query, |field| match field {
                    fields::ID => Some(model.id.clone()),
                    fields::DISPLAY_NAME => Some(model.display_name.clone()),
                    _ => None,
                })
            })
            .collect()
    }

    async fn query_values(&self, query: &RecordQuery) -> StorageResult<Vec<Record>> {
        let mut select = configuration_values::Entity::find()
            .order_by_asc(configuration_values::Column::Id);
        for filter in query.filters() {
            let column = value_column(filter.field())?;
            select = select.filter(column.eq(filter.value()));
        }

        let models = select
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        models
            .into_iter()
            .map(|model| {
                project(query, |field| match field {
                    fields::ID => Some(model.id.clone()),
                    fields::DEFINITION_ID => Some(model.definition_id.clone()),
                    fields::RAW_TEXT => Some(model.raw_text.clone()),
                    _ => None,
                })
            })
            .collect()
    }
}

fn definition_column(field: &str) -> StorageResult<configuration_definitions::Column> {
    match field {
        fields::ID => Ok(configuration_definitions::Column::Id),
        fields::DISPLAY_NAME => Ok(configuration_definitions::Column::DisplayName),
        other => Err(unknown_field(DEFINITION_TABLE, other)),
    }
}

fn value_column(field: &str) -> StorageResult<configuration_values::Column> {
    match field {
        fields::ID => Ok(configuration_values::Column::Id),
        fields::DEFINITION_ID => Ok(configuration_values::Column::DefinitionId),
        fields::RAW_TEXT => Ok(configuration_values::Column::RawText),
        other => Err(unknown_field(VALUE_TABLE, other)),
    }
}

/// Builds a record holding only the selected fields.
fn project<F>(query: &RecordQuery, lookup: F) -> StorageResult<Record>
where
    F: Fn(&str) -> Option<String>,
{
    let mut record = Record::new();
    for field in query.selected_fields() {
        let value =
            lookup(field.as_str()).ok_or_else(|| unknown_field(query.table_name(), field))?;
        record.insert(field.clone(), value);
    }
    Ok(record)
}

fn unknown_field(table: &str, field: &str) -> StorageError {
    StorageError::UnknownField {
        table: table.to_string(),
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveModelTrait, Set};

    async fn store() -> SeaOrmRecordStore {
        SeaOrmRecordStore::connect("sqlite::memory:")
            .await
            .expect("storage inits")
    }

    async fn seed_definition(store: &SeaOrmRecordStore, id: &str, name: &str) {
        configuration_definitions::ActiveModel {
            id: Set(id.to_string()),
            display_name: Set(name.to_string()),
        }
        .insert(store.connection())
        .await
        .unwrap();
    }

    async fn seed_value(store: &SeaOrmRecordStore, id: &str, definition_id: &str, raw: &str) {
        configuration_values::ActiveModel {
            id: Set(id.to_string()),
            definition_id: Set(definition_id.to_string()),
            raw_text: Set(raw.to_string()),
        }
        .insert(store.connection())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn filters_definitions_by_display_name() {
        let store = store().await;
        seed_definition(&store, "def-1", "Demo - Endpoint Addresses").await;
        seed_definition(&store, "def-2", "Other").await;

        let rows = store
            .query(
                &RecordQuery::table(DEFINITION_TABLE)
                    .filter_eq(fields::DISPLAY_NAME, "Demo - Endpoint Addresses")
                    .select([fields::ID, fields::DISPLAY_NAME]),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(fields::ID), Some("def-1"));
        assert_eq!(
            rows[0].get(fields::DISPLAY_NAME),
            Some("Demo - Endpoint Addresses")
        );
    }

    #[tokio::test]
    async fn projects_only_selected_value_fields() {
        let store = store().await;
        seed_value(&store, "val-1", "def-1", r#"{"Endpoints":[]}"#).await;
        seed_value(&store, "val-2", "def-2", "{}").await;

        let rows = store
            .query(
                &RecordQuery::table(VALUE_TABLE)
                    .filter_eq(fields::DEFINITION_ID, "def-1")
                    .select([fields::RAW_TEXT]),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(fields::RAW_TEXT), Some(r#"{"Endpoints":[]}"#));
        assert_eq!(rows[0].get(fields::ID), None);
    }

    #[tokio::test]
    async fn quoted_values_are_bound_not_interpolated() {
        let store = store().await;
        seed_definition(&store, "def-1", "O'Brien").await;

        let rows = store
            .query(
                &RecordQuery::table(DEFINITION_TABLE)
                    .filter_eq(fields::DISPLAY_NAME, "O'Brien")
                    .select([fields::ID]),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let injected = store
            .query(
                &RecordQuery::table(DEFINITION_TABLE)
                    .filter_eq(fields::DISPLAY_NAME, "x' OR '1'='1")
                    .select([fields::ID]),
            )
            .await
            .unwrap();
        assert!(injected.is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_tables_and_fields() {
        let store = store().await;

        let err = store
            .query(&RecordQuery::table("accounts"))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::UnknownTable("accounts".into()));

        let err = store
            .query(&RecordQuery::table(DEFINITION_TABLE).filter_eq("owner", "me"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UnknownField { ref field, .. } if field == "owner"));
    }

    #[tokio::test]
    async fn end_to_end_resolution_through_sea_orm() {
        let store = store().await;
        seed_definition(&store, "def-1", "Demo - Endpoint Addresses").await;
        seed_value(
            &store,
            "val-1",
            "def-1",
            r#"{"Endpoints":[{"environment":"E1","endpoint":"https://a"}]}"#,
        )
        .await;

        let value = endpoint_relay_domain::services::resolve_config(
            &store,
            "Demo - Endpoint Addresses",
        )
        .await
        .expect("resolves");
        let endpoint = endpoint_relay_domain::services::select_endpoint(&value.raw_text, "E1")
            .unwrap()
            .unwrap();
        assert_eq!(endpoint.as_str(), "https://a");
    }
}
