mod parser;
mod types;

pub use parser::{default_columns, parse_columns, parse_columns_str};
pub use types::{ColumnType, Columns};
