//! SQLite record store.

use super::{RecordStore, StoreError};
use crate::badges;
use crate::types::{Employee, EmployeeFields};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS employee (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    object_key TEXT,
    full_name TEXT NOT NULL,
    location TEXT NOT NULL,
    job_title TEXT NOT NULL,
    badges TEXT NOT NULL DEFAULT ''
);";

const COLUMNS: &str = "id, object_key, full_name, location, job_title, badges";

/// Relational backend. Ids are integer rowids rendered as decimal strings.
pub struct SqlStore {
    conn: Mutex<Connection>,
}

impl SqlStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let id: i64 = row.get(0)?;
    let badges: String = row.get(5)?;
    Ok(Employee {
        id: id.to_string(),
        object_key: row.get(1)?,
        full_name: row.get(2)?,
        location: row.get(3)?,
        job_title: row.get(4)?,
        badges: badges::parse_badges(&badges),
    })
}

/// Normalized CSV for the `badges` column.
fn badge_column(fields: &EmployeeFields) -> String {
    badges::join_badges(&fields.badge_list())
}

impl RecordStore for SqlStore {
    fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM employee ORDER BY full_name"
        ))?;
        let employees = stmt
            .query_map([], employee_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }

    fn load(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(None);
        };
        let conn = self.conn()?;
        let employee = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM employee WHERE id = ?1"),
                params![rowid],
                employee_from_row,
            )
            .optional()?;
        Ok(employee)
    }

    fn create(
        &self,
        photo_key: Option<&str>,
        fields: &EmployeeFields,
    ) -> Result<String, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO employee (object_key, full_name, location, job_title, badges)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                photo_key,
                fields.full_name,
                fields.location,
                fields.job_title,
                badge_column(fields)
            ],
        )?;
        Ok(conn.last_insert_rowid().to_string())
    }

    fn update(
        &self,
        id: &str,
        photo_key: Option<&str>,
        fields: &EmployeeFields,
    ) -> Result<(), StoreError> {
        let rowid = id
            .parse::<i64>()
            .map_err(|_| StoreError::NotFound(id.to_string()))?;
        let conn = self.conn()?;
        let badges = badge_column(fields);
        let changed = match photo_key {
            Some(key) => conn.execute(
                "UPDATE employee
                 SET object_key = ?1, full_name = ?2, location = ?3, job_title = ?4, badges = ?5
                 WHERE id = ?6",
                params![
                    key,
                    fields.full_name,
                    fields.location,
                    fields.job_title,
                    badges,
                    rowid
                ],
            )?,
            None => conn.execute(
                "UPDATE employee
                 SET full_name = ?1, location = ?2, job_title = ?3, badges = ?4
                 WHERE id = ?5",
                params![
                    fields.full_name,
                    fields.location,
                    fields.job_title,
                    badges,
                    rowid
                ],
            )?,
        };
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(());
        };
        self.conn()?
            .execute("DELETE FROM employee WHERE id = ?1", params![rowid])?;
        Ok(())
    }
}
