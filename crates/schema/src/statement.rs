use std::fmt::{self, Display, Formatter};

use crate::{ColumnDefinition, ForeignKeyDefinition, IndexDefinition};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    /// Creates a table with its columns and foreign keys. Indexes are created
    /// by separate statements.
    CreateTable {
        table: String,
        columns: Vec<ColumnDefinition>,
        foreign_keys: Vec<ForeignKeyDefinition>,
    },
    AddColumn {
        table: String,
        column: ColumnDefinition,
    },
    AlterColumn {
        table: String,
        column: ColumnDefinition,
    },
    DropColumn {
        table: String,
        column: String,
    },
    CreateIndex(IndexDefinition),
    DropIndex {
        table: String,
        name: String,
    },
    CreateForeignKey(ForeignKeyDefinition),
    DropForeignKey {
        table: String,
        name: String,
    },
    /// Opaque DML. It does not change the shape of the schema.
    Sql(String),
}

fn write_names(f: &mut Formatter<'_>, names: &[String]) -> fmt::Result {
    for (idx, name) in names.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "\"{}\"", name)?;
    }
    Ok(())
}

fn write_foreign_key(f: &mut Formatter<'_>, foreign_key: &ForeignKeyDefinition) -> fmt::Result {
    write!(f, "CONSTRAINT \"{}\" FOREIGN KEY (", foreign_key.name)?;
    write_names(f, &foreign_key.columns)?;
    write!(f, ") REFERENCES \"{}\" (", foreign_key.referenced_table)?;
    write_names(f, &foreign_key.referenced_columns)?;
    f.write_str(")")
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable {
                table,
                columns,
                foreign_keys,
            } => {
                write!(f, "CREATE TABLE \"{}\" (", table)?;
                for (idx, column) in columns.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", column)?;
                }
                for foreign_key in foreign_keys {
                    f.write_str(", ")?;
                    write_foreign_key(f, foreign_key)?;
                }
                f.write_str(")")
            }
            Statement::AddColumn { table, column } => {
                write!(f, "ALTER TABLE \"{}\" ADD COLUMN {}", table, column)
            }
            Statement::AlterColumn { table, column } => {
                write!(f, "ALTER TABLE \"{}\" ALTER COLUMN {}", table, column)
            }
            Statement::DropColumn { table, column } => {
                write!(f, "ALTER TABLE \"{}\" DROP COLUMN \"{}\"", table, column)
            }
            Statement::CreateIndex(index) => {
                if index.unique {
                    f.write_str("CREATE UNIQUE INDEX ")?;
                } else {
                    f.write_str("CREATE INDEX ")?;
                }
                write!(f, "\"{}\" ON \"{}\" (", index.name, index.table)?;
                write_names(f, &index.columns)?;
                f.write_str(")")
            }
            Statement::DropIndex { table, name } => {
                write!(f, "DROP INDEX \"{}\" ON \"{}\"", name, table)
            }
            Statement::CreateForeignKey(foreign_key) => {
                write!(f, "ALTER TABLE \"{}\" ADD ", foreign_key.table)?;
                write_foreign_key(f, foreign_key)
            }
            Statement::DropForeignKey { table, name } => {
                write!(f, "ALTER TABLE \"{}\" DROP CONSTRAINT \"{}\"", table, name)
            }
            Statement::Sql(sql) => f.write_str(sql),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;

    #[test]
    fn render() {
        let foreign_key = ForeignKeyDefinition::new(
            "FK_dictionaryValue_language",
            "dictionaryValue",
            "languageId",
            "language",
            "id",
        );

        assert_eq!(
            Statement::CreateTable {
                table: "dictionaryValue".to_string(),
                columns: vec![
                    ColumnDefinition::new("id", ColumnType::Integer).primary_key(),
                    ColumnDefinition::new("languageId", ColumnType::Integer),
                ],
                foreign_keys: vec![foreign_key.clone()],
            }
            .to_string(),
            "CREATE TABLE \"dictionaryValue\" (\"id\" INTEGER NOT NULL PRIMARY KEY, \"languageId\" INTEGER NOT NULL, CONSTRAINT \"FK_dictionaryValue_language\" FOREIGN KEY (\"languageId\") REFERENCES \"language\" (\"id\"))"
        );
        assert_eq!(
            Statement::CreateForeignKey(foreign_key).to_string(),
            "ALTER TABLE \"dictionaryValue\" ADD CONSTRAINT \"FK_dictionaryValue_language\" FOREIGN KEY (\"languageId\") REFERENCES \"language\" (\"id\")"
        );
        assert_eq!(
            Statement::CreateIndex(
                IndexDefinition::new("IX_language_isoCode", "language", ["isoCode"]).unique()
            )
            .to_string(),
            "CREATE UNIQUE INDEX \"IX_language_isoCode\" ON \"language\" (\"isoCode\")"
        );
        assert_eq!(
            Statement::AlterColumn {
                table: "language".to_string(),
                column: ColumnDefinition::new("isoCode", ColumnType::VarChar(14)).nullable(),
            }
            .to_string(),
            "ALTER TABLE \"language\" ALTER COLUMN \"isoCode\" VARCHAR(14)"
        );
        assert_eq!(
            Statement::DropForeignKey {
                table: "dictionaryValue".to_string(),
                name: "FK_dictionaryValue_language".to_string(),
            }
            .to_string(),
            "ALTER TABLE \"dictionaryValue\" DROP CONSTRAINT \"FK_dictionaryValue_language\""
        );
    }
}
