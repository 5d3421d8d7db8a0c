// Table model - metadata, column schema, rows, and record stamping

use crate::error::{JsonTableError, Result};
use crate::schema::{ColumnType, Columns};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A flat mapping from column name to value
pub type Record = serde_json::Map<String, Value>;

pub const DEFAULT_PRIMARY_KEY: &str = "id";
pub const CREATED_AT_COLUMN: &str = "createdAt";
pub const UPDATED_AT_COLUMN: &str = "updatedAt";

/// Current UTC time as RFC 3339 with millisecond precision, e.g. `2026-10-18T09:15:02.113Z`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    /// Last value handed out by auto-increment. Zero until the first assignment.
    pub last_id: u64,
    pub primary_key: String,
    pub auto_increment: bool,
    pub created_at: String,
}

/// Options accepted at table creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    pub primary_key: Option<String>,
    pub auto_increment: bool,
    pub created_at: bool,
    pub updated_at: bool,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    pub fn auto_increment(mut self, enabled: bool) -> Self {
        self.auto_increment = enabled;
        self
    }

    pub fn created_at(mut self, enabled: bool) -> Self {
        self.created_at = enabled;
        self
    }

    pub fn updated_at(mut self, enabled: bool) -> Self {
        self.updated_at = enabled;
        self
    }
}

/// Stored form of a table inside the database document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub metadata: TableMetadata,
    pub columns: Columns,
    pub data: Vec<Record>,
}

/// Working view of one table. Holds no reference to storage; the caller
/// validates columns before construction and records after `add_record`.
#[derive(Debug, Clone)]
pub struct Table {
    metadata: TableMetadata,
    columns: Columns,
    data: Vec<Record>,
}

impl Table {
    pub fn new(columns: &Columns, options: &TableOptions) -> Self {
        let mut columns = columns.clone();
        if options.created_at {
            columns.insert(CREATED_AT_COLUMN, ColumnType::Date);
        }
        if options.updated_at {
            columns.insert(UPDATED_AT_COLUMN, ColumnType::Date);
        }

        Table {
            metadata: TableMetadata {
                last_id: 0,
                primary_key: options
                    .primary_key
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string()),
                auto_increment: options.auto_increment,
                created_at: now_timestamp(),
            },
            columns,
            data: Vec::new(),
        }
    }

    /// Rebuild a working table from its stored form
    pub fn from_record(record: TableRecord) -> Self {
        Table {
            metadata: record.metadata,
            columns: record.columns,
            data: record.data,
        }
    }

    /// Build the stored row for `record` and append it.
    ///
    /// `createdAt`/`updatedAt` values that are missing or empty (`null`,
    /// `false`, `""`, `0`) are stamped with the current time when the table
    /// declares those columns. With auto-increment on and no primary-key field
    /// present, `lastId` is bumped and assigned. The input is copied, never
    /// aliased. No schema validation happens here.
    pub fn add_record(&mut self, record: &Record) -> Result<Record> {
        let mut row = record.clone();
        let now = now_timestamp();

        for column in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
            let lacks_value = row.get(column).map(is_empty_value).unwrap_or(true);
            if self.columns.contains(column) && lacks_value {
                row.insert(column.to_string(), Value::String(now.clone()));
            }
        }

        if self.metadata.auto_increment && !row.contains_key(&self.metadata.primary_key) {
            let next_id = self.metadata.last_id.checked_add(1).ok_or_else(|| {
                JsonTableError::Validation(format!(
                    "Auto-increment counter for {} is exhausted.",
                    self.metadata.primary_key
                ))
            })?;
            self.metadata.last_id = next_id;
            row.insert(self.metadata.primary_key.clone(), Value::from(next_id));
        }

        self.data.push(row.clone());
        Ok(row)
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    pub fn rows(&self) -> &[Record] {
        &self.data
    }

    pub fn to_record(&self) -> TableRecord {
        self.clone().into_record()
    }

    pub fn into_record(self) -> TableRecord {
        TableRecord {
            metadata: self.metadata,
            columns: self.columns,
            data: self.data,
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}
