mod database;
mod definition;
mod dialect;
mod error;
mod snapshot;
mod statement;
mod validation;

pub use database::{Database, MemoryDatabase};
pub use definition::{
    ColumnDefinition, ColumnType, ForeignKeyDefinition, IndexDefinition, Table, TableDefinition,
};
pub use dialect::Dialect;
pub use error::{DatabaseError, SchemaError};
pub use snapshot::{SchemaSnapshot, TableSnapshot};
pub use statement::Statement;
pub use validation::SchemaValidation;
