use crate::document::DatabaseDocument;
use crate::error::{JsonTableError, Result};
use crate::schema::{ColumnType, Columns};
use crate::table::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Prefix reserved for document-level keys such as the format tag
pub const RESERVED_PREFIX: char = '$';

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// Seconds-precision zoned forms are covered by RFC 3339
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z"];

/// Validate a single column type token, returning its canonical form.
pub fn validate_column_type(column: &str, token: &str) -> Result<ColumnType> {
    token.parse().map_err(|_| invalid_column_type(column, token))
}

/// Validate a column declaration. It must be a flat mapping of column name to
/// type token; every token must name a known type.
pub fn validate_columns(declaration: &Value) -> Result<Columns> {
    let mapping = declaration.as_object().ok_or_else(|| {
        JsonTableError::Schema(
            "Columns must be an object with column names as keys and data types as values."
                .into(),
        )
    })?;

    let mut columns = Vec::with_capacity(mapping.len());
    for (name, token) in mapping {
        let ty = match token {
            Value::String(s) => validate_column_type(name, s)?,
            other => return Err(invalid_column_type(name, &other.to_string())),
        };
        columns.push((name.clone(), ty));
    }

    Ok(columns.into_iter().collect())
}

fn invalid_column_type(column: &str, token: &str) -> JsonTableError {
    JsonTableError::Schema(format!(
        "Invalid column {column} type: {token}. Valid types are: {}",
        ColumnType::valid_types()
    ))
}

/// The primary key must name a declared column
pub fn validate_primary_key(columns: &Columns, primary_key: &str) -> Result<()> {
    if !columns.contains(primary_key) {
        return Err(JsonTableError::Schema(format!(
            "Primary key {primary_key} is not defined in columns."
        )));
    }
    Ok(())
}

/// Table names starting with `$` collide with document-level keys
pub fn validate_table_name(table: &str) -> Result<()> {
    if table.is_empty() {
        return Err(JsonTableError::Schema("Table name must not be empty.".into()));
    }
    if table.starts_with(RESERVED_PREFIX) {
        return Err(JsonTableError::Schema(format!(
            "Table name {table} is reserved: names may not start with '{RESERVED_PREFIX}'."
        )));
    }
    Ok(())
}

pub fn validate_table_exists(document: &DatabaseDocument, table: &str) -> Result<()> {
    if !document.contains(table) {
        return Err(JsonTableError::NotFound {
            table: table.to_string(),
        });
    }
    Ok(())
}

/// Check a record against a column schema.
///
/// Every declared column must be present and hold a value of the declared
/// type. No coercion is applied: `"42"` is not a number. Keys that are not
/// declared columns pass through unchecked.
pub fn validate_record(columns: &Columns, record: &Record) -> Result<()> {
    for (column, ty) in columns.iter() {
        let value = record.get(column).ok_or_else(|| {
            JsonTableError::Validation(format!("Missing column {column} in the record."))
        })?;
        validate_value_type(column, ty, value)?;
    }
    Ok(())
}

fn validate_value_type(column: &str, ty: ColumnType, value: &Value) -> Result<()> {
    let ok = match ty {
        ColumnType::String => value.is_string(),
        ColumnType::Number => value.is_number(),
        ColumnType::Boolean => value.is_boolean(),
        ColumnType::Date => value.as_str().map(is_valid_date).unwrap_or(false),
    };

    if ok {
        return Ok(());
    }

    let expected = match ty {
        ColumnType::String => "a string",
        ColumnType::Number => "a number",
        ColumnType::Boolean => "a boolean",
        ColumnType::Date => "a valid date",
    };
    Err(JsonTableError::Validation(format!(
        "Column {column} must be {expected}."
    )))
}

/// Whether `s` parses as a calendar date or date-time.
///
/// Partial dates (`2024`, `2024-05`) stand for the first day of the period.
/// Date-times may carry a `Z` or `±HH:MM` zone, down to minute precision.
pub fn is_valid_date(s: &str) -> bool {
    let s = s.trim();
    if DateTime::parse_from_rfc3339(s).is_ok() || DateTime::parse_from_rfc2822(s).is_ok() {
        return true;
    }
    if is_partial_date(s) || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        return true;
    }
    if OFFSET_DATETIME_FORMATS
        .iter()
        .any(|fmt| DateTime::parse_from_str(s, fmt).is_ok())
    {
        return true;
    }
    let naive = match s.strip_suffix('Z') {
        Some(utc) if utc.contains('T') => utc,
        _ => s,
    };
    NAIVE_DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(naive, fmt).is_ok())
}

// `YYYY` or `YYYY-MM`
fn is_partial_date(s: &str) -> bool {
    let padded = match s.len() {
        4 if s.bytes().all(|b| b.is_ascii_digit()) => format!("{s}-01-01"),
        7 if s.as_bytes()[4] == b'-' => format!("{s}-01"),
        _ => return false,
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").is_ok()
}
