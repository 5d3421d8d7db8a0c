// Database document - every table of one database, and its JSON encoding

use crate::error::{JsonTableError, Result};
use crate::table::TableRecord;
use indexmap::IndexMap;
use serde_json::Value;

/// Top-level key carrying the persisted format version
pub const FORMAT_KEY: &str = "$format";
pub const FORMAT_VERSION: u64 = 1;

/// All tables of one database, keyed by table name in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseDocument {
    tables: IndexMap<String, TableRecord>,
}

impl DatabaseDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn get(&self, table: &str) -> Option<&TableRecord> {
        self.tables.get(table)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Insert or replace a table, returning the previous record if any.
    /// A replaced table keeps its position.
    pub(crate) fn insert(&mut self, table: String, record: TableRecord) -> Option<TableRecord> {
        self.tables.insert(table, record)
    }

    /// Remove a table. Later tables keep their relative order.
    pub(crate) fn remove(&mut self, table: &str) -> Option<TableRecord> {
        self.tables.shift_remove(table)
    }

    /// Encode as the persisted JSON object: the format tag followed by one
    /// entry per table.
    pub fn to_value(&self) -> Result<Value> {
        let mut root = serde_json::Map::new();
        root.insert(FORMAT_KEY.to_string(), Value::from(FORMAT_VERSION));
        for (name, record) in &self.tables {
            root.insert(name.clone(), serde_json::to_value(record)?);
        }
        Ok(Value::Object(root))
    }

    /// Decode a persisted JSON object. A missing format tag is read as the
    /// legacy unversioned layout, which has the same table entries.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(JsonTableError::UnsupportedFormat(
                "database document must be a JSON object".into(),
            ));
        };

        match root.shift_remove(FORMAT_KEY) {
            None if !root.is_empty() => {
                log::warn!("Loading unversioned database document; it is tagged on next write");
            }
            None => {}
            Some(tag) if tag.as_u64() == Some(FORMAT_VERSION) => {}
            Some(tag) => {
                return Err(JsonTableError::UnsupportedFormat(format!(
                    "{FORMAT_KEY} is {tag}, this build reads version {FORMAT_VERSION}"
                )));
            }
        }

        let mut tables = IndexMap::with_capacity(root.len());
        for (name, entry) in root {
            let record: TableRecord = serde_json::from_value(entry)?;
            tables.insert(name, record);
        }

        Ok(DatabaseDocument { tables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_columns;
    use crate::table::{Table, TableOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_record() -> TableRecord {
        Table::new(&default_columns(), &TableOptions::new()).into_record()
    }

    #[test]
    fn test_encode_tags_format() {
        let mut doc = DatabaseDocument::new();
        doc.insert("users".into(), sample_record());

        let value = doc.to_value().unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["$format".to_string(), "users".to_string()]);
        assert_eq!(value["$format"], json!(1));
        assert_eq!(value["users"]["columns"], json!({ "id": "number" }));
    }

    #[test]
    fn test_decode_round_trip() {
        let mut doc = DatabaseDocument::new();
        doc.insert("b".into(), sample_record());
        doc.insert("a".into(), sample_record());

        let decoded = DatabaseDocument::from_value(doc.to_value().unwrap()).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(decoded.table_names(), vec!["b", "a"]);
    }

    #[test]
    fn test_decode_legacy_layout() {
        let legacy = json!({
            "tasks": {
                "metadata": {
                    "lastId": 1,
                    "primaryKey": "id",
                    "autoIncrement": true,
                    "createdAt": "2024-05-01T10:00:00.000Z"
                },
                "columns": { "id": "number", "title": "string" },
                "data": [{ "id": 1, "title": "Finish" }]
            }
        });

        let doc = DatabaseDocument::from_value(legacy).unwrap();
        let tasks = doc.get("tasks").unwrap();
        assert_eq!(tasks.metadata.last_id, 1);
        assert_eq!(tasks.data.len(), 1);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = DatabaseDocument::from_value(json!({ "$format": 2 })).unwrap_err();
        assert!(matches!(err, JsonTableError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = DatabaseDocument::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, JsonTableError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_decode_rejects_incomplete_table() {
        let err = DatabaseDocument::from_value(json!({
            "$format": 1,
            "broken": { "columns": {}, "data": [] }
        }))
        .unwrap_err();
        assert!(matches!(err, JsonTableError::Json(_)));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut doc = DatabaseDocument::new();
        for name in ["a", "b", "c"] {
            doc.insert(name.into(), sample_record());
        }
        assert!(doc.remove("b").is_some());
        assert_eq!(doc.table_names(), vec!["a", "c"]);
        assert!(doc.remove("b").is_none());
    }
}
