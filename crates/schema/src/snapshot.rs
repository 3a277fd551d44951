use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ColumnDefinition, Dialect, ForeignKeyDefinition, IndexDefinition, SchemaError, Statement,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

impl TableSnapshot {
    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}

/// The shape of a database schema at one point in time.
///
/// Index and foreign key names are unique across the whole schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct SchemaSnapshot {
    tables: BTreeMap<String, TableSnapshot>,
}

impl SchemaSnapshot {
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableSnapshot)> {
        self.tables
            .iter()
            .map(|(name, table)| (name.as_str(), table))
    }

    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.get(name)
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// The columns of `table`, empty if the table does not exist.
    pub fn columns(&self, table: &str) -> &[ColumnDefinition] {
        self.tables
            .get(table)
            .map(|table| table.columns.as_slice())
            .unwrap_or_default()
    }

    pub fn column(&self, table: &str, name: &str) -> Option<&ColumnDefinition> {
        self.columns(table).iter().find(|column| column.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.tables
            .values()
            .flat_map(|table| &table.indexes)
            .find(|index| index.name == name)
    }

    pub fn index_exists(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKeyDefinition> {
        self.foreign_keys().find(|foreign_key| foreign_key.name == name)
    }

    pub fn foreign_key_exists(&self, name: &str) -> bool {
        self.foreign_key(name).is_some()
    }

    fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKeyDefinition> {
        self.tables.values().flat_map(|table| &table.foreign_keys)
    }

    /// Applies the effect of `statement`, failing the way a database with
    /// `dialect` would. On error the snapshot is unchanged.
    pub fn apply(&mut self, statement: &Statement, dialect: &Dialect) -> Result<(), SchemaError> {
        match statement {
            Statement::CreateTable {
                table,
                columns,
                foreign_keys,
            } => {
                if self.table_exists(table) {
                    return Err(SchemaError::TableExists(table.clone()));
                }
                let created = TableSnapshot {
                    columns: columns.clone(),
                    indexes: Vec::new(),
                    foreign_keys: Vec::new(),
                };
                for foreign_key in foreign_keys {
                    self.check_foreign_key(foreign_key, Some(&created))?;
                }
                self.tables.insert(
                    table.clone(),
                    TableSnapshot {
                        foreign_keys: foreign_keys.clone(),
                        ..created
                    },
                );
            }
            Statement::AddColumn { table, column } => {
                let snapshot = self.table_mut(table)?;
                if snapshot.has_column(&column.name) {
                    if dialect.rejects_duplicate_columns {
                        return Err(SchemaError::DuplicateColumn {
                            table: table.clone(),
                            column: column.name.clone(),
                        });
                    }
                    return Ok(());
                }
                snapshot.columns.push(column.clone());
            }
            Statement::AlterColumn { table, column } => {
                self.check_alterable(table, &column.name, dialect)?;
                let snapshot = self.table_mut(table)?;
                if let Some(existing) = snapshot
                    .columns
                    .iter_mut()
                    .find(|existing| existing.name == column.name)
                {
                    *existing = column.clone();
                }
            }
            Statement::DropColumn { table, column } => {
                self.check_alterable(table, column, dialect)?;
                let snapshot = self.table_mut(table)?;
                snapshot.columns.retain(|existing| existing.name != *column);
                snapshot
                    .indexes
                    .retain(|index| !index.columns.contains(column));
                snapshot
                    .foreign_keys
                    .retain(|foreign_key| !foreign_key.columns.contains(column));
            }
            Statement::CreateIndex(index) => {
                if self.index_exists(&index.name) {
                    return Err(SchemaError::IndexExists(index.name.clone()));
                }
                for column in &index.columns {
                    self.require_column(&index.table, column)?;
                }
                self.table_mut(&index.table)?.indexes.push(index.clone());
            }
            Statement::DropIndex { table, name } => {
                let snapshot = self.table_mut(table)?;
                let position = snapshot
                    .indexes
                    .iter()
                    .position(|index| index.name == *name)
                    .ok_or_else(|| SchemaError::UnknownIndex(name.clone()))?;
                snapshot.indexes.remove(position);
            }
            Statement::CreateForeignKey(foreign_key) => {
                self.check_foreign_key(foreign_key, None)?;
                self.table_mut(&foreign_key.table)?
                    .foreign_keys
                    .push(foreign_key.clone());
            }
            Statement::DropForeignKey { table, name } => {
                let snapshot = self.table_mut(table)?;
                let position = snapshot
                    .foreign_keys
                    .iter()
                    .position(|foreign_key| foreign_key.name == *name)
                    .ok_or_else(|| SchemaError::UnknownForeignKey(name.clone()))?;
                snapshot.foreign_keys.remove(position);
            }
            Statement::Sql(_) => {}
        }

        Ok(())
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut TableSnapshot, SchemaError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    fn require_column(&self, table: &str, column: &str) -> Result<(), SchemaError> {
        let snapshot = self
            .table(table)
            .ok_or_else(|| SchemaError::UnknownTable(table.to_string()))?;
        if !snapshot.has_column(column) {
            return Err(SchemaError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        Ok(())
    }

    /// Checks a foreign key against the schema. `created` stands in for the
    /// declaring table while it is being created, so a key may point at it.
    fn check_foreign_key(
        &self,
        foreign_key: &ForeignKeyDefinition,
        created: Option<&TableSnapshot>,
    ) -> Result<(), SchemaError> {
        if self.foreign_key_exists(&foreign_key.name) {
            return Err(SchemaError::ForeignKeyExists(foreign_key.name.clone()));
        }

        let lookup = |table: &str, column: &str| match created {
            Some(created) if table == foreign_key.table => {
                if created.has_column(column) {
                    Ok(())
                } else {
                    Err(SchemaError::UnknownColumn {
                        table: table.to_string(),
                        column: column.to_string(),
                    })
                }
            }
            _ => self.require_column(table, column),
        };

        for column in &foreign_key.columns {
            lookup(&foreign_key.table, column)?;
        }
        for column in &foreign_key.referenced_columns {
            lookup(&foreign_key.referenced_table, column)?;
        }
        Ok(())
    }

    fn check_alterable(
        &self,
        table: &str,
        column: &str,
        dialect: &Dialect,
    ) -> Result<(), SchemaError> {
        self.require_column(table, column)?;

        if dialect.rejects_altering_referenced_columns {
            if let Some(foreign_key) = self
                .foreign_keys()
                .find(|foreign_key| foreign_key.involves(table, column))
            {
                return Err(SchemaError::ColumnReferenced {
                    table: table.to_string(),
                    column: column.to_string(),
                    foreign_key: foreign_key.name.clone(),
                });
            }
        }

        if dialect.rejects_altering_indexed_columns {
            if let Some(index) = self
                .table(table)
                .into_iter()
                .flat_map(|snapshot| &snapshot.indexes)
                .find(|index| index.columns.iter().any(|name| name == column))
            {
                return Err(SchemaError::ColumnIndexed {
                    table: table.to_string(),
                    column: column.to_string(),
                    index: index.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;

    fn create_table(
        table: &str,
        columns: &[&str],
        foreign_keys: Vec<ForeignKeyDefinition>,
    ) -> Statement {
        Statement::CreateTable {
            table: table.to_string(),
            columns: columns
                .iter()
                .map(|name| ColumnDefinition::new(*name, ColumnType::Integer))
                .collect(),
            foreign_keys,
        }
    }

    fn schema(dialect: &Dialect) -> SchemaSnapshot {
        let mut schema = SchemaSnapshot::default();
        schema
            .apply(&create_table("language", &["id", "isoCode"], vec![]), dialect)
            .unwrap();
        schema
            .apply(
                &create_table(
                    "dictionaryValue",
                    &["id", "languageId"],
                    vec![ForeignKeyDefinition::new(
                        "FK_dictionaryValue_language",
                        "dictionaryValue",
                        "languageId",
                        "language",
                        "id",
                    )],
                ),
                dialect,
            )
            .unwrap();
        schema
            .apply(
                &Statement::CreateIndex(IndexDefinition::new(
                    "IX_language_isoCode",
                    "language",
                    ["isoCode"],
                )),
                dialect,
            )
            .unwrap();
        schema
    }

    #[test]
    fn introspection() {
        let schema = schema(&Dialect::strict());
        assert!(schema.table_exists("language"));
        assert!(!schema.table_exists("contentNode"));
        assert_eq!(schema.columns("language").len(), 2);
        assert!(schema.columns("contentNode").is_empty());
        assert!(schema.column("language", "isoCode").is_some());
        assert!(schema.index_exists("IX_language_isoCode"));
        assert!(schema.foreign_key_exists("FK_dictionaryValue_language"));
        assert!(!schema.foreign_key_exists("FK_missing"));
    }

    #[test]
    fn create_table_with_unknown_reference() {
        let mut schema = SchemaSnapshot::default();
        let err = schema
            .apply(
                &create_table(
                    "dictionaryValue",
                    &["id", "languageId"],
                    vec![ForeignKeyDefinition::new(
                        "FK_dictionaryValue_language",
                        "dictionaryValue",
                        "languageId",
                        "language",
                        "id",
                    )],
                ),
                &Dialect::strict(),
            )
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownTable("language".to_string()));
        assert!(!schema.table_exists("dictionaryValue"));
    }

    #[test]
    fn duplicate_column() {
        let add = Statement::AddColumn {
            table: "language".to_string(),
            column: ColumnDefinition::new("isoCode", ColumnType::Text),
        };

        let mut strict = schema(&Dialect::strict());
        assert!(matches!(
            strict.apply(&add, &Dialect::strict()),
            Err(SchemaError::DuplicateColumn { .. })
        ));

        let mut lenient = schema(&Dialect::lenient());
        let before = lenient.clone();
        lenient.apply(&add, &Dialect::lenient()).unwrap();
        assert_eq!(lenient, before);
    }

    #[test]
    fn alter_constrained_column() {
        let alter = |column: &str| Statement::AlterColumn {
            table: "language".to_string(),
            column: ColumnDefinition::new(column, ColumnType::BigInt),
        };

        let mut schema = schema(&Dialect::strict());
        assert_eq!(
            schema.apply(&alter("id"), &Dialect::strict()).unwrap_err(),
            SchemaError::ColumnReferenced {
                table: "language".to_string(),
                column: "id".to_string(),
                foreign_key: "FK_dictionaryValue_language".to_string(),
            }
        );
        assert!(matches!(
            schema.apply(&alter("isoCode"), &Dialect::strict()),
            Err(SchemaError::ColumnIndexed { .. })
        ));

        schema.apply(&alter("id"), &Dialect::lenient()).unwrap();
        assert_eq!(
            schema.column("language", "id").unwrap().column_type,
            ColumnType::BigInt
        );
    }

    #[test]
    fn drop_and_recreate() {
        let dialect = Dialect::strict();
        let mut schema = schema(&dialect);

        schema
            .apply(
                &Statement::DropForeignKey {
                    table: "dictionaryValue".to_string(),
                    name: "FK_dictionaryValue_language".to_string(),
                },
                &dialect,
            )
            .unwrap();
        assert!(!schema.foreign_key_exists("FK_dictionaryValue_language"));

        schema
            .apply(
                &Statement::DropIndex {
                    table: "language".to_string(),
                    name: "IX_language_isoCode".to_string(),
                },
                &dialect,
            )
            .unwrap();
        assert!(matches!(
            schema.apply(
                &Statement::DropIndex {
                    table: "language".to_string(),
                    name: "IX_language_isoCode".to_string(),
                },
                &dialect,
            ),
            Err(SchemaError::UnknownIndex(_))
        ));

        assert!(matches!(
            schema.apply(
                &Statement::CreateIndex(IndexDefinition::new("IX_bad", "language", ["missing"])),
                &dialect,
            ),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn serde() {
        let schema = schema(&Dialect::strict());
        let text = serde_json::to_string(&schema).unwrap();
        assert_eq!(serde_json::from_str::<SchemaSnapshot>(&text).unwrap(), schema);
    }
}
