// Persistence - whole-document reads and writes behind a small trait

use crate::error::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where database documents live. Implementations only move whole documents;
/// they know nothing about tables.
pub trait Persistence {
    /// Deterministic location for a database name. The containing directory
    /// exists once this returns.
    fn resolve_path(&self, database: &str) -> Result<PathBuf>;

    fn exists(&self, path: &Path) -> bool;

    /// Read the document at `path`. A missing document is created as `{}`
    /// and returned as such.
    fn read_document(&self, path: &Path) -> Result<Value>;

    /// Replace the document at `path` in full.
    fn write_document(&self, path: &Path, document: &Value) -> Result<()>;
}

/// Stores each database as `<data_dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = FileStore {
            data_dir: data_dir.into(),
        };
        store.ensure_data_dir()?;
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }
}

impl Persistence for FileStore {
    fn resolve_path(&self, database: &str) -> Result<PathBuf> {
        self.ensure_data_dir()?;
        Ok(self.data_dir.join(format!("{database}.json")))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_document(&self, path: &Path) -> Result<Value> {
        if !path.exists() {
            let empty = Value::Object(serde_json::Map::new());
            self.write_document(path, &empty)?;
            return Ok(empty);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replacing an existing document writes a temp file beside `path`, gives
    /// it the old file's permissions, then renames it into place. A new
    /// document is written directly so it picks up the process umask.
    fn write_document(&self, path: &Path, document: &Value) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(document)?;
        let permissions = match std::fs::metadata(path) {
            Ok(meta) => meta.permissions(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut file = std::fs::File::create(path)?;
                file.write_all(content.as_bytes())?;
                file.sync_all()?;
                log::debug!("Created {} ({} bytes)", path.display(), content.len());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().set_permissions(permissions)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        log::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

/// In-process store keeping each document as its serialized text
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text of a stored document, as it would appear on disk
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl Persistence for MemoryStore {
    fn resolve_path(&self, database: &str) -> Result<PathBuf> {
        Ok(PathBuf::from(format!("{database}.json")))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_document(&self, path: &Path) -> Result<Value> {
        let existing = self.files.borrow().get(path).cloned();
        match existing {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => {
                let empty = Value::Object(serde_json::Map::new());
                self.write_document(path, &empty)?;
                Ok(empty)
            }
        }
    }

    fn write_document(&self, path: &Path, document: &Value) -> Result<()> {
        let content = serde_json::to_string_pretty(document)?;
        self.files.borrow_mut().insert(path.to_path_buf(), content);
        Ok(())
    }
}
