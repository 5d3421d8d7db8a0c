use super::types::{ColumnType, Columns};
use crate::error::Result;
use crate::validation;
use serde_json::Value;

/// Column set used when a table is created without an explicit declaration
pub fn default_columns() -> Columns {
    std::iter::once(("id".to_string(), ColumnType::Number)).collect()
}

/// Parse a JSON column declaration (`{"name": "type", ...}`) into a canonical `Columns`.
/// Type tokens are matched case-insensitively and stored lowercase.
pub fn parse_columns(declaration: &Value) -> Result<Columns> {
    validation::validate_columns(declaration)
}

/// Parse a column declaration from JSON text
pub fn parse_columns_str(content: &str) -> Result<Columns> {
    let declaration: Value = serde_json::from_str(content)?;
    parse_columns(&declaration)
}
