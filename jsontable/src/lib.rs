pub mod schema;
pub mod validation;
pub mod table;
pub mod document;
pub mod storage;
pub mod config;
pub mod database;
pub mod error;

pub use config::DatabaseConfig;
pub use database::Database;
pub use document::DatabaseDocument;
pub use error::{JsonTableError, Result};
pub use schema::{ColumnType, Columns};
pub use storage::{FileStore, MemoryStore, Persistence};
pub use table::{Record, Table, TableMetadata, TableOptions, TableRecord};
