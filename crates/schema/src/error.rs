use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum SchemaError {
    #[error("table `{0}` does not exist")]
    UnknownTable(String),

    #[error("table `{0}` already exists")]
    TableExists(String),

    #[error("column `{table}.{column}` does not exist")]
    UnknownColumn { table: String, column: String },

    #[error("column `{table}.{column}` already exists")]
    DuplicateColumn { table: String, column: String },

    #[error("column `{table}.{column}` is referenced by foreign key `{foreign_key}`")]
    ColumnReferenced {
        table: String,
        column: String,
        foreign_key: String,
    },

    #[error("column `{table}.{column}` is used by index `{index}`")]
    ColumnIndexed {
        table: String,
        column: String,
        index: String,
    },

    #[error("index `{0}` does not exist")]
    UnknownIndex(String),

    #[error("index `{0}` already exists")]
    IndexExists(String),

    #[error("foreign key `{0}` does not exist")]
    UnknownForeignKey(String),

    #[error("foreign key `{0}` already exists")]
    ForeignKeyExists(String),

    #[error("table `{table}` has no {kind} named `{name}`")]
    NotDefined {
        table: String,
        kind: &'static str,
        name: String,
    },
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to execute `{statement}`: {source}")]
    Statement {
        statement: String,
        #[source]
        source: SchemaError,
    },
}
