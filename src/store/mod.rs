//! Employee record persistence.
//!
//! One trait, [`RecordStore`], with two backends chosen at startup from
//! `database.backend`:
//!
//! | Backend | Type | Storage | Ids |
//! |---|---|---|---|
//! | `sql` | [`SqlStore`] | SQLite via `rusqlite` | integer rowid |
//! | `kv` | [`KvStore`] | JSON document file | UUID v4 |
//!
//! Both backends list employees ordered by `full_name`.

mod kv;
mod sql;

pub use kv::KvStore;
pub use sql::SqlStore;

use crate::config::{DatabaseBackend, DirectoryConfig};
use crate::types::{Employee, EmployeeFields};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt record file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no employee with id {0}")]
    NotFound(String),
    #[error("record store lock poisoned")]
    Poisoned,
}

/// CRUD over employee records.
///
/// `photo_key` on [`update`](RecordStore::update) is only written when
/// present; `None` keeps whatever key the record already has.
pub trait RecordStore: Send + Sync {
    fn list(&self) -> Result<Vec<Employee>, StoreError>;

    /// `Ok(None)` when no record has this id, including ids the backend
    /// could never have issued.
    fn load(&self, id: &str) -> Result<Option<Employee>, StoreError>;

    /// Insert a record and return its new id.
    fn create(&self, photo_key: Option<&str>, fields: &EmployeeFields)
    -> Result<String, StoreError>;

    fn update(
        &self,
        id: &str,
        photo_key: Option<&str>,
        fields: &EmployeeFields,
    ) -> Result<(), StoreError>;

    /// Deleting an id that does not exist is not an error.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Location of the record store for a config, relative to its data dir.
pub fn store_path(config: &DirectoryConfig) -> PathBuf {
    let name = &config.database.db_name;
    match config.database.backend {
        DatabaseBackend::Sql => config.data_dir.join(format!("{name}.sqlite3")),
        DatabaseBackend::Kv => config.data_dir.join(format!("{name}.json")),
    }
}

/// Open the backend selected by `database.backend`, creating the data
/// directory if needed.
pub fn open_record_store(config: &DirectoryConfig) -> Result<Box<dyn RecordStore>, StoreError> {
    std::fs::create_dir_all(&config.data_dir)?;
    let path = store_path(config);
    log::debug!(
        "opening {:?} record store at {}",
        config.database.backend,
        path.display()
    );
    Ok(match config.database.backend {
        DatabaseBackend::Sql => Box::new(SqlStore::open(&path)?),
        DatabaseBackend::Kv => Box::new(KvStore::open(&path)?),
    })
}
