use ledger::LedgerState;
use schema::{ColumnDefinition, Database, Dialect, SchemaSnapshot, Statement, Table};
use semver::Version;

use crate::{base_data::base_data, MigrationError};

/// Everything a step may touch while it runs.
///
/// The schema is introspected at most once per context, on first use, and
/// then kept up to date with the statements the step executes. A context is
/// never reused for another step.
pub struct MigrationContext<'a> {
    db: &'a mut dyn Database,
    ledger: &'a LedgerState,
    plan: &'a str,
    version: &'a Version,
    schema: Option<SchemaSnapshot>,
}

impl<'a> MigrationContext<'a> {
    pub fn new(
        db: &'a mut dyn Database,
        ledger: &'a LedgerState,
        plan: &'a str,
        version: &'a Version,
    ) -> Self {
        Self {
            db,
            ledger,
            plan,
            version,
            schema: None,
        }
    }

    #[inline]
    pub fn ledger(&self) -> &LedgerState {
        self.ledger
    }

    #[inline]
    pub fn plan(&self) -> &str {
        self.plan
    }

    #[inline]
    pub fn version(&self) -> &Version {
        self.version
    }

    pub fn schema(&mut self) -> Result<&SchemaSnapshot, MigrationError> {
        let schema = match self.schema.take() {
            Some(schema) => schema,
            None => {
                tracing::debug!(plan = self.plan, version = %self.version, "introspect schema");
                self.db.introspect()?
            }
        };
        Ok(&*self.schema.insert(schema))
    }

    pub fn execute(&mut self, statement: Statement) -> Result<(), MigrationError> {
        self.db.execute(&statement)?;

        // the database already accepted the statement, so replaying it only has
        // to mirror its effect
        if let Some(schema) = &mut self.schema {
            if schema.apply(&statement, &Dialect::lenient()).is_err() {
                self.schema = None;
            }
        }
        Ok(())
    }

    pub fn columns<T: Table>(&mut self) -> Result<Vec<ColumnDefinition>, MigrationError> {
        let table = T::name();
        Ok(self.schema()?.columns(&table).to_vec())
    }

    pub fn add_column<T: Table>(&mut self, name: &str) -> Result<(), MigrationError> {
        let definition = T::definition();
        let column = definition.find_column(name)?.clone();
        self.execute(Statement::AddColumn {
            table: definition.name,
            column,
        })
    }

    /// Adds `name` unless it is in `existing`, a column list fetched earlier
    /// with [`columns`](Self::columns). Returns whether the column was added.
    pub fn add_column_if_not_exists<T: Table>(
        &mut self,
        existing: &[ColumnDefinition],
        name: &str,
    ) -> Result<bool, MigrationError> {
        if existing.iter().any(|column| column.name == name) {
            tracing::debug!(table = T::name().as_str(), column = name, "column exists");
            return Ok(false);
        }
        self.add_column::<T>(name)?;
        Ok(true)
    }

    pub fn alter_column<T: Table>(&mut self, name: &str) -> Result<(), MigrationError> {
        let definition = T::definition();
        let column = definition.find_column(name)?.clone();
        self.execute(Statement::AlterColumn {
            table: definition.name,
            column,
        })
    }

    pub fn table_exists(&mut self, name: &str) -> Result<bool, MigrationError> {
        Ok(self.schema()?.table_exists(name))
    }

    /// Creates the table of `T` followed by its indexes.
    pub fn create_table<T: Table>(&mut self) -> Result<(), MigrationError> {
        let definition = T::definition();
        self.execute(Statement::CreateTable {
            table: definition.name,
            columns: definition.columns,
            foreign_keys: definition.foreign_keys,
        })?;
        for index in definition.indexes {
            self.execute(Statement::CreateIndex(index))?;
        }
        Ok(())
    }

    pub fn create_table_if_not_exists<T: Table>(&mut self) -> Result<bool, MigrationError> {
        if self.table_exists(&T::name())? {
            return Ok(false);
        }
        self.create_table::<T>()?;
        Ok(true)
    }

    /// Inserts the rows a new installation starts with into `T`.
    pub fn insert_base_data<T: Table>(&mut self) -> Result<(), MigrationError> {
        let table = T::name();
        let statements = base_data(&table);
        if statements.is_empty() {
            return Ok(());
        }
        tracing::info!(table = table.as_str(), rows = statements.len(), "insert base data");
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    pub fn index_exists(&mut self, name: &str) -> Result<bool, MigrationError> {
        Ok(self.schema()?.index_exists(name))
    }

    /// Drops those of the named indexes of `T` that exist.
    pub fn delete_indexes<T, I>(&mut self, names: I) -> Result<(), MigrationError>
    where
        T: Table,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let table = T::name();
        for name in names {
            let name = name.as_ref();
            let exists = self
                .schema()?
                .table(&table)
                .map_or(false, |snapshot| {
                    snapshot.indexes.iter().any(|index| index.name == name)
                });
            if exists {
                self.execute(Statement::DropIndex {
                    table: table.clone(),
                    name: name.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// Creates those of the named indexes of `T` that do not exist yet.
    pub fn create_indexes<T, I>(&mut self, names: I) -> Result<(), MigrationError>
    where
        T: Table,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let definition = T::definition();
        for name in names {
            let index = definition.find_index(name.as_ref())?;
            if !self.index_exists(&index.name)? {
                self.execute(Statement::CreateIndex(index.clone()))?;
            }
        }
        Ok(())
    }

    pub fn foreign_key_exists(&mut self, name: &str) -> Result<bool, MigrationError> {
        Ok(self.schema()?.foreign_key_exists(name))
    }

    /// Drops the foreign key if it exists. Returns whether it did.
    pub fn delete_foreign_key(&mut self, table: &str, name: &str) -> Result<bool, MigrationError> {
        if !self.foreign_key_exists(name)? {
            return Ok(false);
        }
        self.execute(Statement::DropForeignKey {
            table: table.to_string(),
            name: name.to_string(),
        })?;
        Ok(true)
    }

    /// Creates those of the named foreign keys of `T` that do not exist yet.
    pub fn create_foreign_keys<T, I>(&mut self, names: I) -> Result<(), MigrationError>
    where
        T: Table,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let definition = T::definition();
        for name in names {
            let foreign_key = definition.find_foreign_key(name.as_ref())?;
            if !self.foreign_key_exists(&foreign_key.name)? {
                self.execute(Statement::CreateForeignKey(foreign_key.clone()))?;
            }
        }
        Ok(())
    }
}
