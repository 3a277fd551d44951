use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::SchemaError;

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Integer,
    BigInt,
    Bool,
    Uuid,
    DateTime,
    Text,
    VarChar(u32),
}

impl ColumnType {
    /// The declared width of a character column.
    pub fn width(&self) -> Option<u32> {
        match self {
            ColumnType::VarChar(width) => Some(*width),
            _ => None,
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::BigInt => f.write_str("BIGINT"),
            ColumnType::Bool => f.write_str("BOOLEAN"),
            ColumnType::Uuid => f.write_str("UUID"),
            ColumnType::DateTime => f.write_str("TIMESTAMP"),
            ColumnType::Text => f.write_str("TEXT"),
            ColumnType::VarChar(width) => write!(f, "VARCHAR({})", width),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: false,
        }
    }

    #[must_use]
    pub fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    #[must_use]
    pub fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }
}

impl Display for ColumnDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.name, self.column_type)?;
        if !self.nullable {
            f.write_str(" NOT NULL")?;
        }
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl IndexDefinition {
    pub fn new<I, S>(name: impl Into<String>, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    #[must_use]
    pub fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

impl ForeignKeyDefinition {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: vec![column.into()],
            referenced_table: referenced_table.into(),
            referenced_columns: vec![referenced_column.into()],
        }
    }

    /// Returns `true` if this key is declared on, or points at, `table.column`.
    pub fn involves(&self, table: &str, column: &str) -> bool {
        (self.table == table && self.columns.iter().any(|name| name == column))
            || (self.referenced_table == table
                && self.referenced_columns.iter().any(|name| name == column))
    }
}

/// The declared shape of a table.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn index<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes
            .push(IndexDefinition::new(name, self.name.clone(), columns));
        self
    }

    #[must_use]
    pub fn unique_index<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes
            .push(IndexDefinition::new(name, self.name.clone(), columns).unique());
        self
    }

    #[must_use]
    pub fn foreign_key(
        mut self,
        name: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyDefinition::new(
            name,
            self.name.clone(),
            column,
            referenced_table,
            referenced_column,
        ));
        self
    }

    pub fn find_column(&self, name: &str) -> Result<&ColumnDefinition, SchemaError> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| self.not_defined("column", name))
    }

    pub fn find_index(&self, name: &str) -> Result<&IndexDefinition, SchemaError> {
        self.indexes
            .iter()
            .find(|index| index.name == name)
            .ok_or_else(|| self.not_defined("index", name))
    }

    pub fn find_foreign_key(&self, name: &str) -> Result<&ForeignKeyDefinition, SchemaError> {
        self.foreign_keys
            .iter()
            .find(|foreign_key| foreign_key.name == name)
            .ok_or_else(|| self.not_defined("foreign key", name))
    }

    fn not_defined(&self, kind: &'static str, name: &str) -> SchemaError {
        SchemaError::NotDefined {
            table: self.name.clone(),
            kind,
            name: name.to_string(),
        }
    }
}

/// A table known at compile time.
///
/// Migration helpers are generic over this trait so that a step names the
/// table it touches by type, and column or index definitions come from a
/// single place.
pub trait Table {
    fn definition() -> TableDefinition;

    fn name() -> String {
        Self::definition().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Language;

    impl Table for Language {
        fn definition() -> TableDefinition {
            TableDefinition::new("language")
                .column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
                .column(ColumnDefinition::new("isoCode", ColumnType::VarChar(14)).nullable())
                .unique_index("IX_language_isoCode", ["isoCode"])
        }
    }

    #[test]
    fn table_definition() {
        let definition = Language::definition();
        assert_eq!(Language::name(), "language");
        assert_eq!(
            definition.find_column("isoCode").unwrap().column_type.width(),
            Some(14)
        );
        assert!(definition.find_index("IX_language_isoCode").unwrap().unique);
        assert_eq!(
            definition.find_foreign_key("FK_missing").unwrap_err(),
            SchemaError::NotDefined {
                table: "language".to_string(),
                kind: "foreign key",
                name: "FK_missing".to_string(),
            }
        );
    }

    #[test]
    fn column_sql() {
        assert_eq!(
            ColumnDefinition::new("id", ColumnType::Integer)
                .primary_key()
                .to_string(),
            "\"id\" INTEGER NOT NULL PRIMARY KEY"
        );
        assert_eq!(
            ColumnDefinition::new("isoCode", ColumnType::VarChar(14))
                .nullable()
                .to_string(),
            "\"isoCode\" VARCHAR(14)"
        );
    }

    #[test]
    fn foreign_key_involves() {
        let foreign_key =
            ForeignKeyDefinition::new("FK_a", "propertyData", "languageId", "language", "id");
        assert!(foreign_key.involves("propertyData", "languageId"));
        assert!(foreign_key.involves("language", "id"));
        assert!(!foreign_key.involves("language", "isoCode"));
    }
}
