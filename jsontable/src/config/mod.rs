//! Database configuration
//!
//! Names the database and the directory its document lives in.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DATABASE_NAME: &str = "defaultDB";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name; the document is stored as `<name>.json` (default: "defaultDB")
    #[serde(default = "default_name")]
    pub name: String,

    /// Directory holding database documents (default: "data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
        }
    }
}

impl DatabaseConfig {
    pub fn new(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Named database under the default data directory
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
