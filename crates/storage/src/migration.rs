use sea_orm::sea_query::{ColumnDef, Index, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::{configuration_definitions, configuration_values};
use endpoint_relay_domain::storage::{StorageError, StorageResult};

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let definitions_table = Table::create()
        .if_not_exists()
        .table(configuration_definitions::Entity)
        .col(
            ColumnDef::new(configuration_definitions::Column::Id)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(configuration_definitions::Column::DisplayName)
                .string()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, definitions_table).await?;

    let values_table = Table::create()
        .if_not_exists()
        .table(configuration_values::Entity)
        .col(
            ColumnDef::new(configuration_values::Column::Id)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(configuration_values::Column::DefinitionId)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(configuration_values::Column::RawText)
                .text()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, values_table).await?;

    let definition_index = Index::create()
        .if_not_exists()
        .name("idx_configuration_values_definition_id")
        .table(configuration_values::Entity)
        .col(configuration_values::Column::DefinitionId)
        .to_owned();
    db.execute(backend.build(&definition_index))
        .await
        .map_err(StorageError::from_source)?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}
