use serde::Serialize;

use crate::{SchemaSnapshot, TableDefinition};

/// How far a live schema is from the definitions it should match.
#[derive(Debug, Clone, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidation {
    /// Expected tables that exist, whatever their shape.
    pub present_tables: Vec<String>,
    pub missing_tables: Vec<String>,
    /// `(table, column)` pairs that are missing or declared differently.
    pub invalid_columns: Vec<(String, String)>,
    /// Indexes that are missing or cover other columns.
    pub invalid_indexes: Vec<String>,
    /// Indexes on expected tables that no definition declares.
    pub unexpected_indexes: Vec<String>,
    pub invalid_foreign_keys: Vec<String>,
}

impl SchemaValidation {
    pub fn is_valid(&self) -> bool {
        self.missing_tables.is_empty()
            && self.invalid_columns.is_empty()
            && self.invalid_indexes.is_empty()
            && self.unexpected_indexes.is_empty()
            && self.invalid_foreign_keys.is_empty()
    }

    /// `true` when none of the expected tables exist.
    pub fn is_empty(&self) -> bool {
        self.present_tables.is_empty()
    }
}

impl SchemaSnapshot {
    pub fn validate(&self, expected: &[TableDefinition]) -> SchemaValidation {
        let mut validation = SchemaValidation::default();

        for definition in expected {
            let table = match self.table(&definition.name) {
                Some(table) => table,
                None => {
                    validation.missing_tables.push(definition.name.clone());
                    continue;
                }
            };
            validation.present_tables.push(definition.name.clone());

            for column in &definition.columns {
                if self.column(&definition.name, &column.name) != Some(column) {
                    validation
                        .invalid_columns
                        .push((definition.name.clone(), column.name.clone()));
                }
            }

            for index in &definition.indexes {
                if self.index(&index.name) != Some(index) {
                    validation.invalid_indexes.push(index.name.clone());
                }
            }
            validation.unexpected_indexes.extend(
                table
                    .indexes
                    .iter()
                    .filter(|index| definition.find_index(&index.name).is_err())
                    .map(|index| index.name.clone()),
            );

            for foreign_key in &definition.foreign_keys {
                if self.foreign_key(&foreign_key.name) != Some(foreign_key) {
                    validation.invalid_foreign_keys.push(foreign_key.name.clone());
                }
            }
        }

        validation
    }
}
