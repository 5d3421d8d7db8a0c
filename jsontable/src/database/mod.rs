use crate::config::DatabaseConfig;
use crate::document::DatabaseDocument;
use crate::error::{JsonTableError, Result};
use crate::storage::{FileStore, Persistence};
use crate::table::{Record, Table, TableOptions, TableRecord};
use crate::validation;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The main entry point: one named database backed by one JSON document.
///
/// The document is loaded once on open and kept in memory. Every mutation
/// rewrites the whole document through the persistence layer; reads never
/// touch storage. The instance assumes it is the only writer of its
/// document. Two instances (or processes) on the same file overwrite each
/// other's changes.
pub struct Database<P: Persistence = FileStore> {
    name: String,
    path: PathBuf,
    persistence: P,
    document: DatabaseDocument,
}

impl Database<FileStore> {
    /// Open (or create) `<data_dir>/<name>.json`
    pub fn open(name: &str, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = FileStore::new(data_dir)?;
        Self::with_persistence(name, store)
    }

    pub fn open_with_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.name, config.data_dir.clone())
    }
}

impl<P: Persistence> Database<P> {
    /// Open a database through any persistence implementation
    pub fn with_persistence(name: &str, persistence: P) -> Result<Self> {
        let path = persistence.resolve_path(name)?;
        let raw = persistence.read_document(&path)?;
        let document = DatabaseDocument::from_value(raw)?;

        log::debug!(
            "Opened database '{}' at {} ({} tables)",
            name,
            path.display(),
            document.len()
        );

        Ok(Database {
            name: name.to_string(),
            path,
            persistence,
            document,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.document.contains(table)
    }

    /// Create a table from a JSON column declaration (`{"name": "type"}`).
    ///
    /// Fails with `AlreadyExists` on a name collision and with `Schema` on a
    /// malformed declaration or an undeclared primary key. Nothing is stored
    /// unless every check passes.
    pub fn create_table(
        &mut self,
        table: &str,
        columns: &Value,
        options: &TableOptions,
    ) -> Result<()> {
        if self.document.contains(table) {
            return Err(JsonTableError::AlreadyExists {
                table: table.to_string(),
            });
        }
        validation::validate_table_name(table)?;

        let columns = validation::validate_columns(columns)?;
        if let Some(primary_key) = &options.primary_key {
            validation::validate_primary_key(&columns, primary_key)?;
        }

        let created = Table::new(&columns, options);
        let mut staged = self.document.clone();
        staged.insert(table.to_string(), created.into_record());
        self.commit(staged)?;

        log::debug!("Created table '{}' in '{}'", table, self.name);
        Ok(())
    }

    /// Insert a record and return it as stored (timestamps and auto-increment
    /// key applied).
    ///
    /// The stamped record is validated against the table's columns before
    /// anything is kept: on `Validation` failure neither the row nor the
    /// advanced `lastId` reaches memory or storage.
    pub fn insert(&mut self, table: &str, record: &Record) -> Result<Record> {
        let mut working = Table::from_record(self.table(table)?.clone());
        let row = working.add_record(record)?;
        validation::validate_record(working.columns(), &row)?;

        let mut staged = self.document.clone();
        staged.insert(table.to_string(), working.into_record());
        self.commit(staged)?;

        log::debug!("Inserted row into '{}' in '{}'", table, self.name);
        Ok(row)
    }

    /// The full stored table: metadata, columns and every row
    pub fn get_all(&self, table: &str) -> Result<&TableRecord> {
        self.table(table)
    }

    /// Table names in document order
    pub fn get_table_names(&self) -> Vec<String> {
        self.document.table_names()
    }

    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        validation::validate_table_exists(&self.document, table)?;

        let mut staged = self.document.clone();
        staged.remove(table);
        self.commit(staged)?;

        log::debug!("Dropped table '{}' from '{}'", table, self.name);
        Ok(())
    }

    fn table(&self, table: &str) -> Result<&TableRecord> {
        self.document
            .get(table)
            .ok_or_else(|| JsonTableError::NotFound {
                table: table.to_string(),
            })
    }

    /// Write `staged` in full, then adopt it as the in-memory document.
    /// A failed write leaves the current document untouched.
    fn commit(&mut self, staged: DatabaseDocument) -> Result<()> {
        let value = staged.to_value()?;
        self.persistence.write_document(&self.path, &value)?;
        self.document = staged;
        Ok(())
    }
}
