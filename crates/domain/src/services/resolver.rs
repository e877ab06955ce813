//! Two-step configuration lookup: definition by display name, then the
//! value record pointing at that definition.

use tracing::debug;

use crate::error::RelayError;
use crate::model::{ConfigDefinition, ConfigValue, DefinitionId};
use crate::storage::{
    fields, Record, RecordQuery, RecordStore, StorageError, DEFINITION_TABLE, VALUE_TABLE,
};

/// Resolves `name` to its single configuration value. Any definition or
/// value count other than one aborts before the next query is issued.
pub async fn resolve_config<S>(store: &S, name: &str) -> Result<ConfigValue, RelayError>
where
    S: RecordStore + ?Sized,
{
    let definition = find_definition(store, name).await?;
    debug!(name, definition_id = %definition.id, "configuration definition resolved");

    let query = RecordQuery::table(VALUE_TABLE)
        .filter_eq(fields::DEFINITION_ID, definition.id.as_str())
        .select([fields::RAW_TEXT]);
    let mut rows = run_query(store, name, &query).await?;
    if rows.len() != 1 {
        return Err(RelayError::ConfigValueMissing {
            name: name.to_string(),
            definition_id: definition.id.into_inner(),
            matches: rows.len(),
        });
    }

    let raw_text = take_field(rows.remove(0), VALUE_TABLE, fields::RAW_TEXT)
        .map_err(|source| store_error(name, &query, source))?;
    debug!(name, bytes = raw_text.len(), "configuration value resolved");

    Ok(ConfigValue {
        definition_id: definition.id,
        raw_text,
    })
}

async fn find_definition<S>(store: &S, name: &str) -> Result<ConfigDefinition, RelayError>
where
    S: RecordStore + ?Sized,
{
    let query = RecordQuery::table(DEFINITION_TABLE)
        .filter_eq(fields::DISPLAY_NAME, name)
        .select([fields::ID, fields::DISPLAY_NAME]);
    let mut rows = run_query(store, name, &query).await?;
    if rows.len() != 1 {
        return Err(RelayError::ConfigNotFound {
            name: name.to_string(),
            matches: rows.len(),
        });
    }

    let row = rows.remove(0);
    let display_name = row
        .get(fields::DISPLAY_NAME)
        .map(str::to_string)
        .unwrap_or_else(|| name.to_string());
    let id = row
        .into_field(fields::ID)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            store_error(
                name,
                &query,
                StorageError::MissingField {
                    table: DEFINITION_TABLE.to_string(),
                    field: fields::ID.to_string(),
                },
            )
        })?;

    Ok(ConfigDefinition {
        id: DefinitionId::new(id),
        display_name,
    })
}

async fn run_query<S>(store: &S, name: &str, query: &RecordQuery) -> Result<Vec<Record>, RelayError>
where
    S: RecordStore + ?Sized,
{
    store
        .query(query)
        .await
        .map_err(|source| store_error(name, query, source))
}

fn take_field(record: Record, table: &str, field: &str) -> Result<String, StorageError> {
    record
        .into_field(field)
        .ok_or_else(|| StorageError::MissingField {
            table: table.to_string(),
            field: field.to_string(),
        })
}

fn store_error(name: &str, query: &RecordQuery, source: StorageError) -> RelayError {
    RelayError::RecordStore {
        name: name.to_string(),
        table: query.table_name().to_string(),
        query: query.filter_expression(),
        source,
    }
}
