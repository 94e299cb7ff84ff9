//! Key-value record store backed by a single JSON document.
//!
//! Items are keyed by UUID. Empty badge lists and absent photo keys are left
//! out of the stored item rather than written as empty values. Every write
//! goes to a temp file that is renamed over the document.

use super::{RecordStore, StoreError};
use crate::types::{Employee, EmployeeFields};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

type Items = BTreeMap<String, Employee>;

pub struct KvStore {
    path: PathBuf,
    items: Mutex<Items>,
}

impl KvStore {
    /// Open the document at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let items = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Items::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            items: Mutex::new(items),
        })
    }

    fn items(&self) -> Result<MutexGuard<'_, Items>, StoreError> {
        self.items.lock().map_err(|_| StoreError::Poisoned)
    }

    fn persist(&self, items: &Items) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to a copy of the items, persist it, then publish it.
    /// A failed write leaves the in-memory state untouched.
    fn modify<T>(
        &self,
        change: impl FnOnce(&mut Items) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut items = self.items()?;
        let mut next = items.clone();
        let result = change(&mut next)?;
        self.persist(&next)?;
        *items = next;
        Ok(result)
    }
}

impl RecordStore for KvStore {
    fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<Employee> = self.items()?.values().cloned().collect();
        employees.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(employees)
    }

    fn load(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.items()?.get(id).cloned())
    }

    fn create(
        &self,
        photo_key: Option<&str>,
        fields: &EmployeeFields,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let employee = Employee {
            id: id.clone(),
            full_name: fields.full_name.clone(),
            location: fields.location.clone(),
            job_title: fields.job_title.clone(),
            badges: fields.badge_list(),
            object_key: photo_key.map(String::from),
        };
        self.modify(|items| {
            items.insert(id.clone(), employee);
            Ok(())
        })?;
        Ok(id)
    }

    fn update(
        &self,
        id: &str,
        photo_key: Option<&str>,
        fields: &EmployeeFields,
    ) -> Result<(), StoreError> {
        self.modify(|items| {
            let employee = items
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            employee.full_name = fields.full_name.clone();
            employee.location = fields.location.clone();
            employee.job_title = fields.job_title.clone();
            employee.badges = fields.badge_list();
            if let Some(key) = photo_key {
                employee.object_key = Some(key.to_string());
            }
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        if !self.items()?.contains_key(id) {
            return Ok(());
        }
        self.modify(|items| {
            items.remove(id);
            Ok(())
        })
    }
}
