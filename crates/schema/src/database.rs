use crate::{DatabaseError, Dialect, SchemaSnapshot, Statement};

/// A connection able to describe and change its schema.
pub trait Database {
    fn introspect(&self) -> Result<SchemaSnapshot, DatabaseError>;

    fn execute(&mut self, statement: &Statement) -> Result<(), DatabaseError>;
}

/// A database that only has a schema.
///
/// Statements are checked against the dialect exactly as
/// [`SchemaSnapshot::apply`] does, and every executed statement is kept in
/// order.
#[derive(Debug, Default, Clone)]
pub struct MemoryDatabase {
    schema: SchemaSnapshot,
    dialect: Dialect,
    executed: Vec<Statement>,
}

impl MemoryDatabase {
    pub fn new(dialect: Dialect) -> Self {
        Self::from_snapshot(SchemaSnapshot::default(), dialect)
    }

    pub fn from_snapshot(schema: SchemaSnapshot, dialect: Dialect) -> Self {
        Self {
            schema,
            dialect,
            executed: Vec::new(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.schema
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The statements executed successfully so far.
    #[inline]
    pub fn executed(&self) -> &[Statement] {
        &self.executed
    }
}

impl Database for MemoryDatabase {
    fn introspect(&self) -> Result<SchemaSnapshot, DatabaseError> {
        Ok(self.schema.clone())
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), DatabaseError> {
        match self.schema.apply(statement, &self.dialect) {
            Ok(()) => {
                tracing::debug!(statement = %statement, "execute");
                self.executed.push(statement.clone());
                Ok(())
            }
            Err(err) => {
                tracing::error!(statement = %statement, error = %err, "statement failed");
                Err(DatabaseError::Statement {
                    statement: statement.to_string(),
                    source: err,
                })
            }
        }
    }
}
